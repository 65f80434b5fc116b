//! Reverse lookup from a point to the seascape it belongs to.

use tracing::debug;

use crate::assemble::{SeascapeCollection, SeascapeWindow};
use crate::error::{Result, SeascapeError};
use crate::grid::millis;
use crate::point::Point;

/// Looks points up in an assembled collection.
///
/// Candidates are ranked by planar distance (in degrees) to the window
/// centers, then by distance to the center time step. Of the best-ranked
/// windows, only one whose center cell actually contains the point is
/// returned; the geometrically nearest window is never substituted.
#[derive(Clone, Copy, Debug)]
pub struct SeascapeSelector<'a> {
    collection: &'a SeascapeCollection,
}

impl<'a> SeascapeSelector<'a> {
    pub fn new(collection: &'a SeascapeCollection) -> Self {
        Self { collection }
    }

    pub fn select(&self, p: &Point) -> Result<&'a SeascapeWindow> {
        let i = self.select_index(p)?;
        Ok(&self.collection.windows()[i])
    }

    /// Position of the matching window in the collection.
    pub fn select_index(&self, p: &Point) -> Result<usize> {
        let not_found = || SeascapeError::PointNotInAnySeascape { lat: p.lat, lon: p.lon };
        let windows = self.collection.windows();

        let keys: Vec<(f64, f64)> = windows.iter().map(|w| rank(w, p)).collect();
        let best_dist = keys.iter().map(|k| k.0).reduce(f64::min).ok_or_else(not_found)?;
        let best_dt = keys
            .iter()
            .filter(|k| within_tolerance(k.0, best_dist))
            .map(|k| k.1)
            .fold(f64::INFINITY, f64::min);

        // Rounding in the distances can rank a neighbour ahead of the cell a
        // midpoint resolved to, so every near-best candidate is tried. Center
        // cells are disjoint and at most one of them contains the point.
        let found = keys
            .iter()
            .enumerate()
            .filter(|&(_, k)| within_tolerance(k.0, best_dist) && within_tolerance(k.1, best_dt))
            .map(|(i, _)| i)
            .find(|&i| windows[i].bounds.contains(p));

        match found {
            Some(i) => {
                debug!(lat = p.lat, lon = p.lon, window = i, "seascape selected");
                Ok(i)
            }
            None => Err(not_found()),
        }
    }
}

/// Relative slack on ranking keys, far above float rounding in the
/// distances and far below the spacing of any real grid.
const RANK_TOLERANCE: f64 = 1e-9;

fn within_tolerance(key: f64, best: f64) -> bool {
    key <= best + RANK_TOLERANCE * best.max(1.0)
}

/// Squared lat/lon distance to the window center, then absolute time offset
/// in milliseconds (zero when either side has no time).
fn rank(w: &SeascapeWindow, p: &Point) -> (f64, f64) {
    let dlat = p.lat - w.center_lat;
    let dlon = p.lon - w.center_lon;
    let dt = match (w.center_time, p.time) {
        (Some(c), Some(t)) => (millis(t) - millis(c)).abs(),
        _ => 0.0,
    };
    (dlat * dlat + dlon * dlon, dt)
}

/// Look `p` up in `collection`.
pub fn select<'a>(collection: &'a SeascapeCollection, p: &Point) -> Result<&'a SeascapeWindow> {
    SeascapeSelector::new(collection).select(p)
}
