//! Nearest-cell lookup on a [`RegularGrid`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::grid::{CellBounds, RegularGrid, millis};
use crate::point::Point;

/// Grid cell a point resolves to. `time` is set only when seascapes are
/// windowed in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CellIndex {
    pub lat: usize,
    pub lon: usize,
    pub time: Option<usize>,
}

/// Half-cell bounds of a center cell; time bounds are in epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CenterBounds {
    pub lat: CellBounds,
    pub lon: CellBounds,
    pub time: Option<CellBounds>,
}

impl CenterBounds {
    pub fn contains(&self, p: &Point) -> bool {
        if !(self.lat.contains(p.lat) && self.lon.contains(p.lon)) {
            return false;
        }
        match (self.time, p.time) {
            (Some(b), Some(t)) => b.contains(millis(t)),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GridIndex<'a> {
    grid: &'a RegularGrid,
}

impl<'a> GridIndex<'a> {
    pub fn new(grid: &'a RegularGrid) -> Self {
        Self { grid }
    }

    /// `(lat_index, lon_index)` of the nearest grid cell. Each axis is
    /// searched independently; points off the grid snap to the edge.
    pub fn resolve(&self, p: &Point) -> (usize, usize) {
        (self.grid.lat().nearest(p.lat), self.grid.lon().nearest(p.lon))
    }

    /// Nearest time step, `None` when the grid has no time axis.
    pub fn resolve_time(&self, t: DateTime<Utc>) -> Option<usize> {
        self.grid.time().map(|axis| axis.nearest(t))
    }

    pub fn bounds(&self, cell: &CellIndex) -> CenterBounds {
        CenterBounds {
            lat: self.grid.lat().cell_bounds(cell.lat),
            lon: self.grid.lon().cell_bounds(cell.lon),
            time: cell
                .time
                .zip(self.grid.time())
                .map(|(i, axis)| axis.axis().cell_bounds(i)),
        }
    }
}
