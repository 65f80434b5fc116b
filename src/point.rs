use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeascapeError};

/// A geographic query point, optionally time-stamped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            time: None,
        }
    }

    pub fn at(lat: f64, lon: f64, time: DateTime<Utc>) -> Self {
        Self {
            lat,
            lon,
            time: Some(time),
        }
    }
}

/// Lat/lon bounding box, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Area a data request must cover so that every point's seascape fits,
/// padded by one grid cell on each side.
///
/// Returns `None` for an empty point set.
pub fn request_extent(points: &[Point], seascape_size: f64, gridsize: f64) -> Result<Option<Extent>> {
    if !seascape_size.is_finite() || seascape_size < 0.0 {
        return Err(SeascapeError::InvalidWindowSize(seascape_size));
    }
    let Some(first) = points.first() else {
        return Ok(None);
    };

    let mut ext = Extent {
        min_lat: first.lat,
        max_lat: first.lat,
        min_lon: first.lon,
        max_lon: first.lon,
    };
    for p in &points[1..] {
        ext.min_lat = ext.min_lat.min(p.lat);
        ext.max_lat = ext.max_lat.max(p.lat);
        ext.min_lon = ext.min_lon.min(p.lon);
        ext.max_lon = ext.max_lon.max(p.lon);
    }

    let pad = gridsize + seascape_size / 2.0;
    ext.min_lat -= pad;
    ext.max_lat += pad;
    ext.min_lon -= pad;
    ext.max_lon += pad;
    Ok(Some(ext))
}
