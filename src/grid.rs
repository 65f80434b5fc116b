use chrono::{DateTime, TimeDelta, Utc};
use ndarray::{Array2, Array3, Array4, ArrayD, Axis as ArrayAxis, Ix4};
use serde::Serialize;

use crate::error::{AxisName, Result, SeascapeError};

/// Half-open or closed interval covered by one grid cell along one axis.
/// Which ends are closed encodes the tie rule of [`Axis::nearest`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CellBounds {
    pub lo: f64,
    pub hi: f64,
    pub lo_closed: bool,
    pub hi_closed: bool,
}

impl CellBounds {
    pub const UNBOUNDED: CellBounds = CellBounds {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
        lo_closed: true,
        hi_closed: true,
    };

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        let above = if self.lo_closed { x >= self.lo } else { x > self.lo };
        let below = if self.hi_closed { x <= self.hi } else { x < self.hi };
        above && below
    }
}

/// Strictly monotonic coordinate axis (ascending or descending).
///
/// Midpoints between neighbouring values are computed once and drive both
/// nearest-cell lookup and cell containment, so the two can never disagree.
#[derive(Clone, Debug)]
pub struct Axis {
    name: AxisName,
    values: Vec<f64>,
    mids: Vec<f64>,
    ascending: bool,
}

impl Axis {
    pub fn new(name: AxisName, values: Vec<f64>) -> Result<Self> {
        let invalid = |reason: String| SeascapeError::InvalidAxis { axis: name, reason };

        if values.is_empty() {
            return Err(invalid("axis is empty".into()));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(invalid(format!("non-finite value {v}")));
        }
        let ascending = values.len() < 2 || values[1] > values[0];
        for (i, pair) in values.windows(2).enumerate() {
            let ok = if ascending { pair[1] > pair[0] } else { pair[1] < pair[0] };
            if !ok {
                return Err(invalid(format!("not strictly monotonic at index {}", i + 1)));
            }
        }

        // Halve before adding so values near f64::MAX stay finite.
        let mids = values.windows(2).map(|p| 0.5 * p[0] + 0.5 * p[1]).collect();
        Ok(Self {
            name,
            values,
            mids,
            ascending,
        })
    }

    pub fn name(&self) -> AxisName {
        self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Index of the axis value nearest to `x`. Ties go to the lower index.
    /// There is no extent check: values past either end snap to the edge.
    pub fn nearest(&self, x: f64) -> usize {
        if self.ascending {
            self.mids.partition_point(|&m| m < x)
        } else {
            self.mids.partition_point(|&m| m > x)
        }
    }

    /// Half-cell bounds of cell `i`. Edge cells extend half of the adjacent
    /// step past the edge value. A single-value axis has one unbounded cell.
    pub fn cell_bounds(&self, i: usize) -> CellBounds {
        let n = self.values.len();
        if n == 1 {
            return CellBounds::UNBOUNDED;
        }
        let v = &self.values;

        // Bound shared with cell i-1: a tie there belongs to i-1.
        let (prev, prev_closed) = if i == 0 {
            (v[0] - (0.5 * v[1] - 0.5 * v[0]), true)
        } else {
            (self.mids[i - 1], false)
        };
        // Bound shared with cell i+1: a tie there belongs to i.
        let next = if i == n - 1 {
            v[n - 1] + (0.5 * v[n - 1] - 0.5 * v[n - 2])
        } else {
            self.mids[i]
        };

        if self.ascending {
            CellBounds {
                lo: prev,
                hi: next,
                lo_closed: prev_closed,
                hi_closed: true,
            }
        } else {
            CellBounds {
                lo: next,
                hi: prev,
                lo_closed: true,
                hi_closed: prev_closed,
            }
        }
    }

    /// Mean absolute spacing, `None` for a single-value axis.
    pub fn mean_step(&self) -> Option<f64> {
        let n = self.values.len();
        (n > 1).then(|| (self.values[n - 1] - self.values[0]).abs() / (n - 1) as f64)
    }
}

#[inline]
pub(crate) fn millis(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64
}

/// Time axis: timestamps plus an [`Axis`] over their epoch milliseconds.
#[derive(Clone, Debug)]
pub struct TimeAxis {
    stamps: Vec<DateTime<Utc>>,
    axis: Axis,
}

impl TimeAxis {
    pub fn new(stamps: Vec<DateTime<Utc>>) -> Result<Self> {
        let axis = Axis::new(AxisName::Time, stamps.iter().map(|&t| millis(t)).collect())?;
        Ok(Self { stamps, axis })
    }

    pub fn stamps(&self) -> &[DateTime<Utc>] {
        &self.stamps
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn nearest(&self, t: DateTime<Utc>) -> usize {
        self.axis.nearest(millis(t))
    }

    pub fn mean_step(&self) -> Option<TimeDelta> {
        self.axis
            .mean_step()
            .map(|ms| TimeDelta::milliseconds(ms.round() as i64))
    }
}

/// In-memory field on a regular lat/lon grid, optionally with depth and time.
///
/// Values are stored as `(lat, lon, depth, time)`; a missing depth or time
/// axis is a singleton dimension.
#[derive(Clone, Debug)]
pub struct RegularGrid {
    name: String,
    units: Option<String>,
    lat: Axis,
    lon: Axis,
    depth: Option<Vec<f64>>,
    time: Option<TimeAxis>,
    values: Array4<f32>,
}

impl RegularGrid {
    /// 2-D field indexed `(lat, lon)`.
    pub fn new(
        name: impl Into<String>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        values: Array2<f32>,
    ) -> Result<Self> {
        Self::from_parts(name, lat, lon, None, None, values.into_dyn())
    }

    /// 3-D field indexed `(lat, lon, time)`.
    pub fn with_time(
        name: impl Into<String>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        time: Vec<DateTime<Utc>>,
        values: Array3<f32>,
    ) -> Result<Self> {
        Self::from_parts(name, lat, lon, None, Some(time), values.into_dyn())
    }

    /// General constructor. `values` must be ordered `(lat, lon[, depth][, time])`.
    pub fn from_parts(
        name: impl Into<String>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        depth: Option<Vec<f64>>,
        time: Option<Vec<DateTime<Utc>>>,
        values: ArrayD<f32>,
    ) -> Result<Self> {
        let lat = Axis::new(AxisName::Lat, lat)?;
        let lon = Axis::new(AxisName::Lon, lon)?;
        if depth.as_ref().is_some_and(|d| d.is_empty()) {
            return Err(SeascapeError::InvalidAxis {
                axis: AxisName::Depth,
                reason: "axis is empty".into(),
            });
        }
        let time = time.map(TimeAxis::new).transpose()?;

        let mut expected = vec![lat.len(), lon.len()];
        if let Some(d) = &depth {
            expected.push(d.len());
        }
        if let Some(t) = &time {
            expected.push(t.len());
        }
        if values.shape() != expected.as_slice() {
            return Err(SeascapeError::ShapeMismatch {
                expected,
                found: values.shape().to_vec(),
            });
        }

        let mut values = values;
        if depth.is_none() {
            values.insert_axis_inplace(ArrayAxis(2));
        }
        if time.is_none() {
            values.insert_axis_inplace(ArrayAxis(3));
        }
        let found = values.shape().to_vec();
        let values = values
            .into_dimensionality::<Ix4>()
            .map_err(|_| SeascapeError::ShapeMismatch { expected, found })?;

        Ok(Self {
            name: name.into(),
            units: None,
            lat,
            lon,
            depth,
            time,
            values,
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn lat(&self) -> &Axis {
        &self.lat
    }

    pub fn lon(&self) -> &Axis {
        &self.lon
    }

    pub fn depth(&self) -> Option<&[f64]> {
        self.depth.as_deref()
    }

    pub fn time(&self) -> Option<&TimeAxis> {
        self.time.as_ref()
    }

    pub fn values(&self) -> &Array4<f32> {
        &self.values
    }

    /// Horizontal pixel size in degrees: mean lat spacing and mean lon
    /// spacing, averaged. A single-value axis contributes nothing.
    pub fn horizontal_gridsize(&self) -> Result<f64> {
        match (self.lat.mean_step(), self.lon.mean_step()) {
            (Some(a), Some(b)) => Ok(0.5 * (a + b)),
            (Some(a), None) | (None, Some(a)) => Ok(a),
            (None, None) => Err(SeascapeError::InvalidAxis {
                axis: AxisName::Lat,
                reason: "a single-cell grid has no horizontal spacing".into(),
            }),
        }
    }
}
