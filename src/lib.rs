//! Fixed-size windows ("seascapes") of gridded ocean fields around points.
//!
//! Points are snapped to their nearest grid cell, duplicate cells are
//! collapsed, and an odd-sized window is cut around each unique cell with
//! both absolute and center-relative coordinates. A [`SeascapeSelector`]
//! maps a point back to the window whose center cell contains it.

pub mod assemble;
pub mod config;
pub mod coords;
pub mod dedup;
pub mod error;
pub mod grid;
pub mod index;
pub mod noise;
pub mod point;
pub mod render;
pub mod rng;
pub mod select;
pub mod synth;
pub mod window;

use tracing_subscriber::{EnvFilter, fmt};

pub use assemble::{SeascapeAssembler, SeascapeCollection, SeascapeWindow, Timing, assemble};
pub use config::{FieldParams, SeascapeParams};
pub use error::{AxisName, Result, SeascapeError};
pub use grid::{Axis, CellBounds, RegularGrid, TimeAxis};
pub use index::{CellIndex, CenterBounds, GridIndex};
pub use point::{Extent, Point, request_extent};
pub use select::{SeascapeSelector, select};

/// Install a `tracing` subscriber for the binaries. `RUST_LOG` overrides the
/// default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,seascape=debug,tower_http=info"));
    fmt().with_env_filter(filter).with_target(false).init();
}
