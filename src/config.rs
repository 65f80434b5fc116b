use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeascapeError};

/// Seascape assembly parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeascapeParams {
    /// Side length of each seascape, in degrees.
    pub size_degrees: f64,
    /// Temporal extent of each seascape, in seconds. Required when the field
    /// has a time axis.
    pub time_range_secs: Option<i64>,
    /// Keep the full depth column instead of the surface level.
    pub include_depth: bool,
}

impl Default for SeascapeParams {
    fn default() -> Self {
        Self {
            size_degrees: 1.0,
            time_range_secs: None,
            include_depth: false,
        }
    }
}

impl SeascapeParams {
    pub fn new(size_degrees: f64) -> Self {
        Self {
            size_degrees,
            ..Self::default()
        }
    }

    pub fn with_time_range(mut self, range: TimeDelta) -> Self {
        self.time_range_secs = Some(range.num_seconds());
        self
    }

    pub fn with_depth(mut self, include_depth: bool) -> Self {
        self.include_depth = include_depth;
        self
    }

    /// Time range as a duration. Ranges chrono cannot represent are an
    /// invalid window size.
    pub fn time_range(&self) -> Result<Option<TimeDelta>> {
        self.time_range_secs
            .map(|secs| {
                TimeDelta::try_seconds(secs).ok_or(SeascapeError::InvalidWindowSize(secs as f64))
            })
            .transpose()
    }
}

/// Synthetic field parameters, used by the CLI and the HTTP server in place
/// of a remote data service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Grid spacing in degrees.
    pub resolution: f64,
    /// Number of daily time steps, 0 for a time-less field.
    pub days: usize,
    /// Number of depth levels, 0 for a surface-only field.
    pub depth_levels: usize,
    /// Spacing between depth levels, in metres.
    pub depth_step: f64,

    // Noise
    pub noise_scale: f32,
    pub noise_amp: f32,
    pub octaves: u32,
}

impl FieldParams {
    /// Number of values the synthetic field will hold. Non-finite when the
    /// extent or resolution is.
    pub fn cell_count(&self) -> f64 {
        let along = |min: f64, max: f64| ((max - min) / self.resolution).floor().max(0.0) + 1.0;
        along(self.min_lat, self.max_lat)
            * along(self.min_lon, self.max_lon)
            * self.days.max(1) as f64
            * self.depth_levels.max(1) as f64
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            min_lat: 30.0,
            max_lat: 45.0,
            min_lon: -30.0,
            max_lon: -10.0,
            resolution: 1.0 / 12.0,
            days: 0,
            depth_levels: 0,
            depth_step: 10.0,
            noise_scale: 0.15,
            noise_amp: 3.0,
            octaves: 4,
        }
    }
}
