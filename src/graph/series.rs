use super::coords::{to_x, to_y, PlotArea};
use super::range::YRange;
use super::surface::{DrawCommand, Shade};
use super::PlotPoint;

/// Visual parameters for one data series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub shade: Shade,
    pub width: f64,
    pub marker_radius: f64,
}

/// Which field of a plot point a series reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesField {
    Systolic,
    Diastolic,
    Pulse,
}

impl SeriesField {
    pub fn value(&self, point: &PlotPoint) -> Option<f64> {
        match self {
            Self::Systolic => Some(point.sys),
            Self::Diastolic => Some(point.dia),
            Self::Pulse => point.pulse,
        }
    }
}

/// Emit the polyline and point markers for one series.
///
/// Points where the field is undefined drop out before the polyline is
/// built: a missing pulse produces a gap the line skips over, connecting
/// the nearest defined neighbors, never a dip to zero. A series with a
/// single defined point gets a marker and no stroke.
pub(super) fn draw_series(
    points: &[PlotPoint],
    field: SeriesField,
    style: &SeriesStyle,
    range: &YRange,
    plot: &PlotArea,
    out: &mut Vec<DrawCommand>,
) {
    let projected: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            field.value(point).map(|value| {
                (
                    to_x(index, points.len(), plot),
                    to_y(value, range, plot),
                )
            })
        })
        .collect();

    if projected.is_empty() {
        return;
    }

    if projected.len() > 1 {
        out.push(DrawCommand::StrokePath {
            points: projected.clone(),
            shade: style.shade,
            width: style.width,
            dash: None,
        });
    }

    for &(x, y) in &projected {
        out.push(DrawCommand::FillCircle {
            x,
            y,
            radius: style.marker_radius,
            shade: style.shade,
        });
    }
}
