use super::coords::{to_y, PlotArea};
use super::range::YRange;
use super::surface::{DrawCommand, Shade, TextAnchor};

/// Hypotension boundary (mmHg). Systolic below this is classified Low.
pub const BP_LOW: f64 = 90.0;
/// Upper end of the normal band.
pub const BP_NORMAL: f64 = 120.0;
/// Upper end of the elevated band; above this is High.
pub const BP_ELEVATED: f64 = 140.0;

const BLUE: Shade = Shade::opaque(59, 130, 246);
const GREEN: Shade = Shade::opaque(16, 185, 129);
const AMBER: Shade = Shade::opaque(245, 158, 11);
const RED: Shade = Shade::opaque(239, 68, 68);

const BAND_ALPHA: f32 = 0.07;
const LINE_ALPHA: f32 = 0.4;
const LABEL_ALPHA: f32 = 0.7;
const BOUNDARY_DASH: (f64, f64) = (6.0, 4.0);

/// Clinical classification of a systolic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Low,
    Normal,
    Elevated,
    High,
}

impl Classification {
    pub fn of(systolic: u16) -> Self {
        let value = systolic as f64;
        if value < BP_LOW {
            Self::Low
        } else if value < BP_NORMAL {
            Self::Normal
        } else if value < BP_ELEVATED {
            Self::Elevated
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::High => "High",
        }
    }

    /// The band/boundary color for this classification. The mapping is
    /// fixed: anything rendered for a zone uses the zone's one color.
    pub fn shade(&self) -> Shade {
        match self {
            Self::Low => BLUE,
            Self::Normal => GREEN,
            Self::Elevated => AMBER,
            Self::High => RED,
        }
    }
}

/// Paint the four classification bands and the three dashed boundary lines.
///
/// Bands are clipped to the computed range. A boundary line (and its label)
/// is drawn only when its value lies strictly inside the range, so nothing
/// lands on the plot edges.
pub(super) fn compose_zones(range: &YRange, plot: &PlotArea, out: &mut Vec<DrawCommand>) {
    let bands = [
        (range.min, BP_LOW, Classification::Low),
        (BP_LOW, BP_NORMAL, Classification::Normal),
        (BP_NORMAL, BP_ELEVATED, Classification::Elevated),
        (BP_ELEVATED, range.max, Classification::High),
    ];

    for (from, to, class) in bands {
        let top = to_y(to.min(range.max), range, plot);
        let bottom = to_y(from.max(range.min), range, plot);
        out.push(DrawCommand::FillRect {
            x: plot.left,
            y: top,
            width: plot.width,
            height: bottom - top,
            shade: class.shade().with_alpha(BAND_ALPHA),
        });
    }

    let boundaries = [
        (BP_LOW, Classification::Low),
        (BP_NORMAL, Classification::Elevated),
        (BP_ELEVATED, Classification::High),
    ];

    for (value, class) in boundaries {
        if value <= range.min || value >= range.max {
            continue;
        }
        let y = to_y(value, range, plot);
        out.push(DrawCommand::StrokePath {
            points: vec![(plot.left, y), (plot.right(), y)],
            shade: class.shade().with_alpha(LINE_ALPHA),
            width: 1.0,
            dash: Some(BOUNDARY_DASH),
        });
        out.push(DrawCommand::FillText {
            x: plot.right() + 3.0,
            y: y + 3.0,
            text: format!("{value:.0}"),
            shade: class.shade().with_alpha(LABEL_ALPHA),
            anchor: TextAnchor::Left,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot() -> PlotArea {
        PlotArea {
            left: 40.0,
            top: 20.0,
            width: 745.0,
            height: 340.0,
        }
    }

    fn dashed_strokes(commands: &[DrawCommand]) -> Vec<&DrawCommand> {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { dash: Some(_), .. }))
            .collect()
    }

    #[test]
    fn typical_range_gets_four_bands_and_three_boundaries() {
        let range = YRange {
            min: 60.0,
            max: 160.0,
        };
        let mut out = Vec::new();
        compose_zones(&range, &plot(), &mut out);

        let bands: Vec<_> = out
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .collect();
        assert_eq!(bands.len(), 4);
        assert_eq!(dashed_strokes(&out).len(), 3);

        let labels: Vec<_> = out
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["90", "120", "140"]);
    }

    #[test]
    fn boundary_on_the_range_edge_is_not_drawn() {
        let range = YRange {
            min: 90.0,
            max: 140.0,
        };
        let mut out = Vec::new();
        compose_zones(&range, &plot(), &mut out);
        // Only 120 is strictly inside.
        assert_eq!(dashed_strokes(&out).len(), 1);
    }

    #[test]
    fn band_color_matches_boundary_color() {
        // The 90 boundary and the Low band share the Low shade (blue); the
        // visual-regression contract is that the mapping never drifts.
        assert_eq!(Classification::Low.shade(), BLUE);
        assert_eq!(Classification::Normal.shade(), GREEN);
        assert_eq!(Classification::Elevated.shade(), AMBER);
        assert_eq!(Classification::High.shade(), RED);
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(Classification::of(89), Classification::Low);
        assert_eq!(Classification::of(90), Classification::Normal);
        assert_eq!(Classification::of(119), Classification::Normal);
        assert_eq!(Classification::of(120), Classification::Elevated);
        assert_eq!(Classification::of(139), Classification::Elevated);
        assert_eq!(Classification::of(140), Classification::High);
    }
}
