//! Ratatui binding for the graph pipeline.
//!
//! Executes the orchestrator's [`DrawCommand`] list on a braille canvas.
//! Logical units here are braille dots: each character cell backs 2×4 of
//! them, which is this surface's device-pixel-ratio story — the widget
//! declares its logical size once per frame and every command stays in
//! logical units.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::Line as TextLine;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line};
use ratatui::widgets::Widget;

use crate::graph::surface::{DrawCommand, DrawSurface, Insets, Shade, TextAnchor, Viewport};

const DOTS_PER_CELL_X: f64 = 2.0;
const DOTS_PER_CELL_Y: f64 = 4.0;

/// Assumed terminal background for alpha pre-blending.
const BACKGROUND: (u8, u8, u8) = (24, 26, 32);

/// The viewport a terminal rect exposes, with insets sized so axis labels
/// land on whole character cells.
pub fn viewport_for(area: Rect) -> Viewport {
    Viewport::new(
        area.width as f64 * DOTS_PER_CELL_X,
        area.height as f64 * DOTS_PER_CELL_Y,
        1.0,
        Insets {
            top: 4.0,
            right: 14.0,
            bottom: 9.0,
            left: 10.0,
        },
    )
}

/// Canvas widget executing a prepared command list.
pub fn trend_graph<'a>(commands: &'a [DrawCommand], viewport: Viewport) -> impl Widget + 'a {
    Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(move |ctx| {
            CanvasSurface { ctx, viewport }.run(commands);
        })
}

struct CanvasSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
    viewport: Viewport,
}

impl CanvasSurface<'_, '_> {
    /// Canvas y grows upward; command y grows downward.
    fn flip(&self, y: f64) -> f64 {
        self.viewport.height - y
    }

    fn color(&self, shade: Shade) -> Color {
        let (r, g, b) = shade.over(BACKGROUND);
        Color::Rgb(r, g, b)
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color) {
        self.ctx.draw(&Line {
            x1,
            y1: self.flip(y1),
            x2,
            y2: self.flip(y2),
            color,
        });
    }

    fn dashed_line(&mut self, from: (f64, f64), to: (f64, f64), on: f64, off: f64, color: Color) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 {
            return;
        }
        let (ux, uy) = (dx / length, dy / length);
        let mut pos = 0.0;
        while pos < length {
            let end = (pos + on).min(length);
            self.line(
                from.0 + ux * pos,
                from.1 + uy * pos,
                from.0 + ux * end,
                from.1 + uy * end,
                color,
            );
            pos = end + off;
        }
    }
}

impl DrawSurface for CanvasSurface<'_, '_> {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn run(&mut self, commands: &[DrawCommand]) {
        for command in commands {
            match command {
                // The canvas starts each frame empty.
                DrawCommand::Clear => {}
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                    shade,
                } => {
                    let color = self.color(*shade);
                    // Fill as one horizontal line per dot row.
                    let mut row = 0.0;
                    while row <= *height {
                        self.line(*x, y + row, x + width, y + row, color);
                        row += 1.0;
                    }
                }
                DrawCommand::StrokePath {
                    points,
                    shade,
                    width: _,
                    dash,
                } => {
                    let color = self.color(*shade);
                    for pair in points.windows(2) {
                        match dash {
                            Some((on, off)) => {
                                self.dashed_line(pair[0], pair[1], *on, *off, color);
                            }
                            None => {
                                self.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, color);
                            }
                        }
                    }
                }
                DrawCommand::FillCircle {
                    x,
                    y,
                    radius,
                    shade,
                } => {
                    let color = self.color(*shade);
                    self.ctx.draw(&Circle {
                        x: *x,
                        y: self.flip(*y),
                        radius: *radius,
                        color,
                    });
                }
                DrawCommand::FillText {
                    x,
                    y,
                    text,
                    shade,
                    anchor,
                } => {
                    let color = self.color(*shade);
                    let text_width = text.chars().count() as f64 * DOTS_PER_CELL_X;
                    let left = match anchor {
                        TextAnchor::Left => *x,
                        TextAnchor::Center => x - text_width / 2.0,
                        TextAnchor::Right => x - text_width,
                    };
                    let line =
                        TextLine::styled(text.clone(), Style::default().fg(color));
                    self.ctx.print(left.max(0.0), self.flip(*y), line);
                }
            }
        }
    }
}
