//! Synthetic fields and points, standing in for a remote data service.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;

use crate::config::FieldParams;
use crate::error::{AxisName, Result, SeascapeError};
use crate::grid::RegularGrid;
use crate::noise::fbm;
use crate::point::Point;
use crate::rng::Rng;

const LAT_LIMIT: f64 = 90.0;
const LON_LIMIT: f64 = 180.0;

/// Degrees per metre of depth the synthetic temperature drops, and the cap.
const DEPTH_COOLING: f64 = 0.04;
const MAX_COOLING: f64 = 12.0;

/// First time step of synthetic time axes.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// `min, min + step, ...` up to and including `max` (within float noise).
pub fn regular_axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    let n = ((max - min) / step + 1e-9).floor().max(0.0) as usize + 1;
    (0..n).map(|i| min + i as f64 * step).collect()
}

/// Sea-temperature-like field: a meridional gradient plus drifting fbm
/// anomalies, cooling with depth.
pub fn synthetic_field(params: &FieldParams, seed: u64) -> Result<RegularGrid> {
    if !params.resolution.is_finite() || params.resolution <= 0.0 {
        return Err(SeascapeError::InvalidAxis {
            axis: AxisName::Lat,
            reason: format!("resolution {} must be positive", params.resolution),
        });
    }
    let lat = regular_axis(params.min_lat, params.max_lat, params.resolution);
    let lon = regular_axis(params.min_lon, params.max_lon, params.resolution);
    let depth: Option<Vec<f64>> = (params.depth_levels > 0)
        .then(|| (0..params.depth_levels).map(|k| k as f64 * params.depth_step).collect());
    let time: Option<Vec<DateTime<Utc>>> = (params.days > 0)
        .then(|| (0..params.days).map(|d| epoch() + TimeDelta::days(d as i64)).collect());

    let levels = depth.clone().unwrap_or_else(|| vec![0.0]);
    let n_time = params.days.max(1);
    let (n_lat, n_lon, n_depth) = (lat.len(), lon.len(), levels.len());

    let mut shape = vec![n_lat, n_lon];
    if depth.is_some() {
        shape.push(n_depth);
    }
    if time.is_some() {
        shape.push(n_time);
    }

    let scale = params.noise_scale as f64;
    let amp = params.noise_amp as f64;
    let row_len = n_lon * n_depth * n_time;
    let mut data = vec![0f32; n_lat * row_len];

    data.par_chunks_mut(row_len).enumerate().for_each(|(i, row)| {
        let la = lat[i];
        let base = 28.0 - 0.3 * la.abs();
        for (j, &lo) in lon.iter().enumerate() {
            for t in 0..n_time {
                // Anomalies drift eastward a little each day.
                let anomaly = amp * fbm(lo - 0.2 * t as f64, la, seed, params.octaves, scale);
                for (k, &d) in levels.iter().enumerate() {
                    let cooling = (d * DEPTH_COOLING).min(MAX_COOLING);
                    row[(j * n_depth + k) * n_time + t] = (base + anomaly - cooling) as f32;
                }
            }
        }
    });

    let found = vec![data.len()];
    let values = ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|_| SeascapeError::ShapeMismatch {
        expected: shape.clone(),
        found,
    })?;
    Ok(RegularGrid::from_parts("thetao", lat, lon, depth, time, values)?.with_units("Celsius"))
}

/// Uniform in `[min, max]`; when `min > max` the range wraps through
/// `±limit` (the antimeridian for longitude).
fn wrapped_uniform(rng: &mut Rng, min: f64, max: f64, limit: f64) -> f64 {
    if min <= max {
        return rng.range_f64(min, max);
    }
    let east = limit - min;
    let r = rng.range_f64(0.0, east + (max + limit));
    if r < east { min + r } else { r - east - limit }
}

/// `n` random points in the given ranges, with random timestamps when a
/// time range is given.
pub fn generate_points(
    n: usize,
    lat_range: (f64, f64),
    lon_range: (f64, f64),
    time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    seed: u64,
) -> Vec<Point> {
    let mut rng = Rng::new(seed ^ 0x5EA5CA9E);
    (0..n)
        .map(|_| {
            let lat = wrapped_uniform(&mut rng, lat_range.0, lat_range.1, LAT_LIMIT);
            let lon = wrapped_uniform(&mut rng, lon_range.0, lon_range.1, LON_LIMIT);
            let time = time_range.map(|(start, end)| {
                let secs = rng.range_i64(start.timestamp(), end.timestamp());
                DateTime::from_timestamp(secs, 0).unwrap_or(start)
            });
            Point { lat, lon, time }
        })
        .collect()
}
