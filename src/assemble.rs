//! Seascape assembly: resolve, deduplicate, extract, attach coordinates.

use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::{Array4, ArrayView2, s};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SeascapeParams;
use crate::coords::{self, WindowCoords};
use crate::dedup;
use crate::error::{AxisName, Result, SeascapeError};
use crate::grid::RegularGrid;
use crate::index::{CellIndex, CenterBounds, GridIndex};
use crate::point::Point;
use crate::window::{DepthSelection, WindowExtractor, WindowRanges, WindowShape, half_width_for};

/// One extracted seascape.
#[derive(Clone, Debug, Serialize)]
pub struct SeascapeWindow {
    pub center: CellIndex,
    pub center_lat: f64,
    pub center_lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_time: Option<DateTime<Utc>>,
    /// Half-cell bounds of the center cell, used for lookup containment.
    pub bounds: CenterBounds,
    pub coords: WindowCoords,
    /// Field values shaped `(lat, lon, depth, time)`.
    pub values: Array4<f32>,
}

impl SeascapeWindow {
    /// Center pixel position inside the window along lat and lon.
    pub fn center_pixel(&self) -> (usize, usize) {
        let (n_lat, n_lon, _, _) = self.values.dim();
        (n_lat / 2, n_lon / 2)
    }

    /// Lat/lon plane at one depth level and time step of the window.
    pub fn plane(&self, depth: usize, time: usize) -> ArrayView2<'_, f32> {
        self.values.slice(s![.., .., depth, time])
    }

    pub fn center_value(&self) -> f32 {
        let (i, j) = self.center_pixel();
        let (_, _, _, n_time) = self.values.dim();
        self.values[[i, j, 0, n_time / 2]]
    }
}

/// Assembled seascapes plus the window each input point was assigned to.
/// Built once by [`SeascapeAssembler`] and read-only afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct SeascapeCollection {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    half_width: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_half_width: Option<usize>,
    windows: Vec<SeascapeWindow>,
    point_to_window: Vec<usize>,
}

impl SeascapeCollection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn half_width(&self) -> usize {
        self.half_width
    }

    pub fn time_half_width(&self) -> Option<usize> {
        self.time_half_width
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[SeascapeWindow] {
        &self.windows
    }

    pub fn window(&self, i: usize) -> Option<&SeascapeWindow> {
        self.windows.get(i)
    }

    pub fn point_to_window(&self) -> &[usize] {
        &self.point_to_window
    }

    /// Window assigned to the `point`-th input point.
    pub fn window_for_point(&self, point: usize) -> Option<&SeascapeWindow> {
        self.point_to_window.get(point).map(|&w| &self.windows[w])
    }
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

fn elapsed_ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

pub struct SeascapeAssembler {
    params: SeascapeParams,
}

impl SeascapeAssembler {
    pub fn new(params: SeascapeParams) -> Self {
        Self { params }
    }

    /// Convert the physical seascape size and time range into half-widths on
    /// `grid`, and decide how depth is handled.
    pub fn window_shape(&self, grid: &RegularGrid) -> Result<WindowShape> {
        let half_width = half_width_for(self.params.size_degrees, grid.horizontal_gridsize()?)?;

        let time_half_width = match (grid.time(), self.params.time_range()?) {
            (Some(axis), Some(range)) => match axis.axis().mean_step() {
                Some(step_ms) => Some(half_width_for(range.num_milliseconds() as f64, step_ms)?),
                None => Some(0),
            },
            (Some(_), None) => return Err(SeascapeError::MissingTimeRange),
            (None, Some(_)) => return Err(SeascapeError::MissingAxis(AxisName::Time)),
            (None, None) => None,
        };

        let depth = match (grid.depth(), self.params.include_depth) {
            (Some(_), true) => DepthSelection::Column,
            (None, true) => return Err(SeascapeError::MissingAxis(AxisName::Depth)),
            (Some(levels), false) => {
                warn!(
                    variable = grid.name(),
                    surface = levels[0],
                    "automatically selecting the surface level; request the depth column to keep all levels"
                );
                DepthSelection::Surface
            }
            (None, false) => DepthSelection::Surface,
        };

        Ok(WindowShape {
            half_width,
            time_half_width,
            depth,
        })
    }

    pub fn assemble(&self, points: &[Point], grid: &RegularGrid) -> Result<SeascapeCollection> {
        self.assemble_timed(points, grid).map(|(collection, _)| collection)
    }

    /// Same as [`assemble`](Self::assemble), also returning per-stage timings.
    pub fn assemble_timed(
        &self,
        points: &[Point],
        grid: &RegularGrid,
    ) -> Result<(SeascapeCollection, Vec<Timing>)> {
        let mut timings = Vec::new();
        let total_start = Instant::now();

        let shape = self.window_shape(grid)?;
        debug!(
            half_width = shape.half_width,
            time_half_width = ?shape.time_half_width,
            depth = ?shape.depth,
            "window shape"
        );

        // 1. Resolve points to cells, one entry per distinct cell
        let t = Instant::now();
        let index = GridIndex::new(grid);
        let assignment = dedup::assign(points, &index, shape.time_half_width.is_some())?;
        timings.push(Timing {
            name: "assign",
            ms: elapsed_ms(t),
        });
        debug!(
            points = points.len(),
            unique = assignment.centers.len(),
            "centers resolved"
        );

        // 2. Cut windows, independently per center
        let t = Instant::now();
        let extractor = WindowExtractor::new(grid, shape);
        let slices: Vec<(WindowRanges, Array4<f32>)> = assignment
            .centers
            .par_iter()
            .map(|cell| extractor.extract(cell))
            .collect::<Result<_>>()?;
        timings.push(Timing {
            name: "extract",
            ms: elapsed_ms(t),
        });

        // 3. Coordinates
        let t = Instant::now();
        let windows: Vec<SeascapeWindow> = assignment
            .centers
            .par_iter()
            .zip(slices.into_par_iter())
            .map(|(cell, (ranges, values))| SeascapeWindow {
                center: *cell,
                center_lat: grid.lat().value(cell.lat),
                center_lon: grid.lon().value(cell.lon),
                center_time: cell.time.zip(grid.time()).map(|(i, axis)| axis.stamps()[i]),
                bounds: index.bounds(cell),
                coords: coords::build(grid, &ranges, cell, shape.depth),
                values,
            })
            .collect();
        timings.push(Timing {
            name: "coords",
            ms: elapsed_ms(t),
        });

        timings.push(Timing {
            name: "TOTAL",
            ms: elapsed_ms(total_start),
        });
        info!(
            variable = grid.name(),
            points = points.len(),
            windows = windows.len(),
            half_width = shape.half_width,
            "seascapes assembled"
        );

        let collection = SeascapeCollection {
            name: grid.name().to_string(),
            units: grid.units().map(str::to_string),
            half_width: shape.half_width,
            time_half_width: shape.time_half_width,
            windows,
            point_to_window: assignment.point_to_center,
        };
        Ok((collection, timings))
    }
}

/// Assemble seascapes for `points` on `grid`.
pub fn assemble(
    points: &[Point],
    grid: &RegularGrid,
    params: &SeascapeParams,
) -> Result<SeascapeCollection> {
    SeascapeAssembler::new(params.clone()).assemble(points, grid)
}
