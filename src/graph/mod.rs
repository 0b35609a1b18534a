//! The trend-graph pipeline.
//!
//! [`render`] turns a filtered session list into an ordered list of
//! [`surface::DrawCommand`]s: Y-range computation, coordinate mapping,
//! classification zones, one gap-skipping polyline per series, and thinned
//! date labels. Everything here is a pure function of its inputs so the
//! whole pipeline can be exercised without a terminal; the ratatui binding
//! lives in `widgets::trend_graph`.

pub mod coords;
pub mod labels;
pub mod range;
pub mod series;
pub mod surface;
pub mod zones;

use chrono::{DateTime, Local, Utc};

use crate::sessions::Session;
use coords::{to_x, to_y};
use labels::select_label_indices;
use range::compute_y_range;
use series::{draw_series, SeriesField, SeriesStyle};
use surface::{DrawCommand, Shade, TextAnchor, Viewport};
use zones::compose_zones;

/// One session projected onto the plot, time-ascending. Recomputed on every
/// render, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub date: DateTime<Utc>,
    pub sys: f64,
    pub dia: f64,
    pub pulse: Option<f64>,
}

impl From<&Session> for PlotPoint {
    fn from(session: &Session) -> Self {
        Self {
            date: session.date,
            sys: session.average.systolic as f64,
            dia: session.average.diastolic as f64,
            pulse: session.average.pulse.map(f64::from),
        }
    }
}

/// Colors and weights for a full render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphStyle {
    pub grid: Shade,
    pub text: Shade,
    pub systolic: SeriesStyle,
    pub diastolic: SeriesStyle,
    pub pulse: SeriesStyle,
    /// Number of horizontal grid intervals; lines drawn is one more.
    pub y_divisions: usize,
    pub max_x_labels: usize,
    pub pulse_enabled: bool,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            grid: Shade::new(120, 128, 144, 0.35),
            text: Shade::opaque(148, 155, 170),
            systolic: SeriesStyle {
                shade: Shade::opaque(239, 68, 68),
                width: 2.5,
                marker_radius: 3.5,
            },
            diastolic: SeriesStyle {
                shade: Shade::opaque(59, 130, 246),
                width: 2.5,
                marker_radius: 3.5,
            },
            pulse: SeriesStyle {
                shade: Shade::opaque(16, 185, 129),
                width: 2.0,
                marker_radius: 3.5,
            },
            y_divisions: 5,
            max_x_labels: 5,
            pulse_enabled: true,
        }
    }
}

impl GraphStyle {
    /// Variant tuned for dot-resolution surfaces (the braille canvas),
    /// where the default pixel weights would smear.
    pub fn compact() -> Self {
        let base = Self::default();
        Self {
            systolic: SeriesStyle {
                width: 1.0,
                marker_radius: 1.2,
                ..base.systolic
            },
            diastolic: SeriesStyle {
                width: 1.0,
                marker_radius: 1.2,
                ..base.diastolic
            },
            pulse: SeriesStyle {
                width: 1.0,
                marker_radius: 1.2,
                ..base.pulse
            },
            ..base
        }
    }
}

/// Project sessions onto plot points, oldest first.
///
/// The collection convention is newest-first; plotting wants left-to-right
/// time progression. The sort is stable, so sessions sharing a timestamp
/// keep their relative order.
pub fn plot_points(sessions: &[Session]) -> Vec<PlotPoint> {
    let mut ascending: Vec<&Session> = sessions.iter().collect();
    ascending.sort_by_key(|session| session.date);
    ascending.into_iter().map(PlotPoint::from).collect()
}

/// Produce the full command list for one redraw.
///
/// Returns `None` for an empty session list: a valid terminal state letting
/// the caller hide the graph region, not an error. Identical input yields
/// identical commands, so redrawing after a resize is just a re-invocation
/// with a new viewport.
pub fn render(
    sessions: &[Session],
    viewport: &Viewport,
    style: &GraphStyle,
) -> Option<Vec<DrawCommand>> {
    if sessions.is_empty() {
        return None;
    }

    let points = plot_points(sessions);
    let range = compute_y_range(&points);
    let plot = viewport.plot_area();

    let mut out = vec![DrawCommand::Clear];

    // Horizontal grid with value labels down the left edge.
    for i in 0..=style.y_divisions {
        let value = range.min + range.span() / style.y_divisions as f64 * i as f64;
        let y = to_y(value, &range, &plot);
        out.push(DrawCommand::StrokePath {
            points: vec![(plot.left, y), (plot.right(), y)],
            shade: style.grid,
            width: 1.0,
            dash: None,
        });
        out.push(DrawCommand::FillText {
            x: plot.left - 6.0,
            y: y + 4.0,
            text: format!("{:.0}", value.round()),
            shade: style.text,
            anchor: TextAnchor::Right,
        });
    }

    compose_zones(&range, &plot, &mut out);

    draw_series(
        &points,
        SeriesField::Systolic,
        &style.systolic,
        &range,
        &plot,
        &mut out,
    );
    draw_series(
        &points,
        SeriesField::Diastolic,
        &style.diastolic,
        &range,
        &plot,
        &mut out,
    );
    if style.pulse_enabled {
        draw_series(
            &points,
            SeriesField::Pulse,
            &style.pulse,
            &range,
            &plot,
            &mut out,
        );
    }

    for index in select_label_indices(points.len(), style.max_x_labels) {
        let text = points[index]
            .date
            .with_timezone(&Local)
            .format("%b %-d")
            .to_string();
        out.push(DrawCommand::FillText {
            x: to_x(index, points.len(), &plot),
            y: plot.bottom() + viewport.insets.bottom * 0.45,
            text,
            shade: style.text,
            anchor: TextAnchor::Center,
        });
    }

    Some(out)
}
