use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Axes a seascape can be windowed along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisName {
    Lat,
    Lon,
    Depth,
    Time,
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AxisName::Lat => "lat",
            AxisName::Lon => "lon",
            AxisName::Depth => "depth",
            AxisName::Time => "time",
        };
        f.write_str(s)
    }
}

/// Errors raised while building or querying seascapes.
#[derive(Debug, Error)]
pub enum SeascapeError {
    /// The window around a center cell runs past the field's index range.
    #[error(
        "window of half-width {half_width} around {axis} index {center} exceeds the axis range 0..{len}"
    )]
    OutOfBoundsWindow {
        axis: AxisName,
        center: usize,
        half_width: usize,
        len: usize,
    },

    /// The axis is shorter than a single window.
    #[error("{axis} axis has {len} cells but a window needs {required}")]
    DegenerateGrid {
        axis: AxisName,
        len: usize,
        required: usize,
    },

    /// The nearest seascape center does not contain the query point.
    #[error("point (lat {lat}, lon {lon}) does not fall in any seascape")]
    PointNotInAnySeascape { lat: f64, lon: f64 },

    /// Axis values are empty, non-finite or not strictly monotonic.
    #[error("invalid {axis} axis: {reason}")]
    InvalidAxis { axis: AxisName, reason: String },

    /// Field values do not match the axis lengths.
    #[error("field shape {found:?} does not match axes {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("invalid seascape size {0}: must be finite and non-negative")]
    InvalidWindowSize(f64),

    /// The field has a time axis but no temporal window was requested.
    #[error("field has a time dimension; a seascape time range is required")]
    MissingTimeRange,

    #[error("point {index} has no timestamp but the seascapes are windowed in time")]
    MissingTimestamp { index: usize },

    /// A window along this axis was requested but the field has no such axis.
    #[error("field has no {0} axis")]
    MissingAxis(AxisName),
}

pub type Result<T> = std::result::Result<T, SeascapeError>;
