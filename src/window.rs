//! Fixed-shape windows around center cells.

use std::ops::Range;

use ndarray::{Array4, s};

use crate::error::{AxisName, Result, SeascapeError};
use crate::grid::RegularGrid;
use crate::index::CellIndex;

/// Tolerance on `size / step` so that e.g. `1.0 / (1/12)` counts as 12 cells.
const CELL_COUNT_EPS: f64 = 1e-9;

/// Half-width in cells for a window spanning `size` at spacing `step`.
///
/// The cell count `ceil(size / step)` is bumped to the next odd number so the
/// window has a center pixel; anything up to one step gives a single pixel.
pub fn half_width_for(size: f64, step: f64) -> Result<usize> {
    if !size.is_finite() || size < 0.0 {
        return Err(SeascapeError::InvalidWindowSize(size));
    }
    let mut n = (size / step - CELL_COUNT_EPS).ceil().max(0.0) as usize;
    if n % 2 == 0 {
        n += 1;
    }
    Ok(n / 2)
}

/// `center - half_width ..= center + half_width`, or an error when that runs
/// past `0..len`. Never clipped.
pub fn window_range(axis: AxisName, len: usize, center: usize, half_width: usize) -> Result<Range<usize>> {
    let required = 2 * half_width + 1;
    if len < required {
        return Err(SeascapeError::DegenerateGrid { axis, len, required });
    }
    if center < half_width || center + half_width >= len {
        return Err(SeascapeError::OutOfBoundsWindow {
            axis,
            center,
            half_width,
            len,
        });
    }
    Ok(center - half_width..center + half_width + 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthSelection {
    /// First depth level only.
    Surface,
    /// Whole depth axis, unwindowed.
    Column,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowShape {
    pub half_width: usize,
    /// `None` passes the time dimension through whole.
    pub time_half_width: Option<usize>,
    pub depth: DepthSelection,
}

/// Index slices of one window, in field axis order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowRanges {
    pub lat: Range<usize>,
    pub lon: Range<usize>,
    pub depth: Range<usize>,
    pub time: Range<usize>,
}

pub struct WindowExtractor<'a> {
    grid: &'a RegularGrid,
    shape: WindowShape,
}

impl<'a> WindowExtractor<'a> {
    pub fn new(grid: &'a RegularGrid, shape: WindowShape) -> Self {
        Self { grid, shape }
    }

    pub fn ranges(&self, cell: &CellIndex) -> Result<WindowRanges> {
        let (_, _, n_depth, n_time) = self.grid.values().dim();
        let hw = self.shape.half_width;

        let lat = window_range(AxisName::Lat, self.grid.lat().len(), cell.lat, hw)?;
        let lon = window_range(AxisName::Lon, self.grid.lon().len(), cell.lon, hw)?;
        let depth = match self.shape.depth {
            DepthSelection::Surface => 0..1,
            DepthSelection::Column => 0..n_depth,
        };
        let time = match (cell.time, self.shape.time_half_width) {
            (Some(center), Some(thw)) => window_range(AxisName::Time, n_time, center, thw)?,
            _ => 0..n_time,
        };
        Ok(WindowRanges { lat, lon, depth, time })
    }

    /// Copy of the field values inside `ranges`, shaped `(lat, lon, depth, time)`.
    pub fn slice(&self, ranges: &WindowRanges) -> Array4<f32> {
        self.grid
            .values()
            .slice(s![
                ranges.lat.clone(),
                ranges.lon.clone(),
                ranges.depth.clone(),
                ranges.time.clone()
            ])
            .to_owned()
    }

    pub fn extract(&self, cell: &CellIndex) -> Result<(WindowRanges, Array4<f32>)> {
        let ranges = self.ranges(cell)?;
        let values = self.slice(&ranges);
        Ok((ranges, values))
    }
}
