//! Absolute and center-relative coordinates of extracted windows.
//!
//! Offsets are plain differences along each coordinate axis (degrees for
//! lat/lon); no great-circle correction is applied.

use std::ops::Range;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::grid::RegularGrid;
use crate::index::CellIndex;
use crate::window::{DepthSelection, WindowRanges};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisCoords {
    pub absolute: Vec<f64>,
    pub relative: Vec<f64>,
}

impl AxisCoords {
    pub fn len(&self) -> usize {
        self.absolute.len()
    }

    pub fn is_empty(&self) -> bool {
        self.absolute.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeCoords {
    pub absolute: Vec<DateTime<Utc>>,
    /// Signed offset from the center time step; serialized in seconds.
    #[serde(serialize_with = "deltas_as_seconds")]
    pub relative: Vec<TimeDelta>,
}

fn deltas_as_seconds<S: Serializer>(deltas: &[TimeDelta], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(deltas.iter().map(|d| d.num_seconds()))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WindowCoords {
    pub lat: AxisCoords,
    pub lon: AxisCoords,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeCoords>,
    /// Depth levels kept in the window, when the column was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<Vec<f64>>,
}

/// Axis values over `range`, and their offsets from the value at `center`.
pub fn axis_coords(values: &[f64], range: Range<usize>, center: usize) -> AxisCoords {
    let c = values[center];
    let absolute = values[range].to_vec();
    let relative = absolute.iter().map(|&v| v - c).collect();
    AxisCoords { absolute, relative }
}

pub fn time_coords(stamps: &[DateTime<Utc>], range: Range<usize>, center: usize) -> TimeCoords {
    let c = stamps[center];
    let absolute = stamps[range].to_vec();
    let relative = absolute.iter().map(|&t| t - c).collect();
    TimeCoords { absolute, relative }
}

/// Coordinates for the window `ranges` cut around `cell`. Depth is reported
/// only when the whole column was kept.
pub fn build(
    grid: &RegularGrid,
    ranges: &WindowRanges,
    cell: &CellIndex,
    depth: DepthSelection,
) -> WindowCoords {
    let lat = axis_coords(grid.lat().values(), ranges.lat.clone(), cell.lat);
    let lon = axis_coords(grid.lon().values(), ranges.lon.clone(), cell.lon);
    let time = cell
        .time
        .zip(grid.time())
        .map(|(center, axis)| time_coords(axis.stamps(), ranges.time.clone(), center));
    let depth = match depth {
        DepthSelection::Column => grid.depth().map(|d| d[ranges.depth.clone()].to_vec()),
        DepthSelection::Surface => None,
    };
    WindowCoords { lat, lon, time, depth }
}
