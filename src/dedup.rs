use indexmap::IndexSet;

use crate::error::{Result, SeascapeError};
use crate::index::{CellIndex, GridIndex};
use crate::point::Point;

/// Unique center cells in first-seen order, and for every input point the
/// position of its center in `centers`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    pub centers: Vec<CellIndex>,
    pub point_to_center: Vec<usize>,
}

/// Resolve every point to its nearest cell and collapse repeats, so each
/// distinct cell is extracted once. With `with_time` the resolved time step
/// is part of the cell and every point must carry a timestamp.
pub fn assign(points: &[Point], index: &GridIndex<'_>, with_time: bool) -> Result<Assignment> {
    let mut centers: IndexSet<CellIndex> = IndexSet::with_capacity(points.len());
    let mut point_to_center = Vec::with_capacity(points.len());

    for (i, p) in points.iter().enumerate() {
        let (lat, lon) = index.resolve(p);
        let time = if with_time {
            let t = p.time.ok_or(SeascapeError::MissingTimestamp { index: i })?;
            index.resolve_time(t)
        } else {
            None
        };
        let (pos, _) = centers.insert_full(CellIndex { lat, lon, time });
        point_to_center.push(pos);
    }

    Ok(Assignment {
        centers: centers.into_iter().collect(),
        point_to_center,
    })
}
