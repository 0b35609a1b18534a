use super::zones::{BP_ELEVATED, BP_LOW};
use super::PlotPoint;

/// The value range covered by the Y axis, both bounds multiples of 10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YRange {
    pub min: f64,
    pub max: f64,
}

impl YRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Derive the Y-axis range from a point series.
///
/// Two sentinel anchors (below the hypotension boundary, above the elevated
/// boundary) join the data so the classification zones stay visible even
/// for flat or narrow series, then each bound gets snapped to the 10-grid
/// and padded outward by one step. The result is always non-degenerate.
pub fn compute_y_range(points: &[PlotPoint]) -> YRange {
    let mut lowest = BP_LOW - 10.0;
    let mut highest = BP_ELEVATED + 10.0;

    for point in points {
        for value in [Some(point.sys), Some(point.dia), point.pulse]
            .into_iter()
            .flatten()
        {
            lowest = lowest.min(value);
            highest = highest.max(value);
        }
    }

    YRange {
        min: (lowest / 10.0).floor() * 10.0 - 10.0,
        max: (highest / 10.0).ceil() * 10.0 + 10.0,
    }
}
