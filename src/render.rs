use ndarray::{ArrayView2, s};
use rayon::prelude::*;

use crate::assemble::SeascapeWindow;
use crate::grid::RegularGrid;
use crate::point::Point;

// Sea temperature ramp, cold to warm.
const SEA_COLD: [u8; 4] = [40, 40, 130, 255];
const SEA_COOL: [u8; 4] = [50, 130, 200, 255];
const SEA_MILD: [u8; 4] = [90, 190, 170, 255];
const SEA_WARM: [u8; 4] = [240, 200, 70, 255];
const SEA_HOT: [u8; 4] = [200, 50, 30, 255];
const MISSING: [u8; 4] = [128, 128, 128, 255];
const MARKER: [u8; 4] = [0, 0, 0, 255];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Color for `v` scaled into `[lo, hi]`. NaN is grey.
fn sea_color(v: f32, lo: f32, hi: f32) -> [u8; 4] {
    if v.is_nan() {
        return MISSING;
    }
    let t = ((v - lo) / (hi - lo).max(1e-6)).clamp(0.0, 1.0);
    if t < 0.25 {
        lerp_color(SEA_COLD, SEA_COOL, t / 0.25)
    } else if t < 0.5 {
        lerp_color(SEA_COOL, SEA_MILD, (t - 0.25) / 0.25)
    } else if t < 0.75 {
        lerp_color(SEA_MILD, SEA_WARM, (t - 0.5) / 0.25)
    } else {
        lerp_color(SEA_WARM, SEA_HOT, (t - 0.75) / 0.25)
    }
}

fn finite_range(plane: &ArrayView2<'_, f32>) -> (f32, f32) {
    plane
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Render a `(lat, lon)` plane, north up. Returns `(rgba, width, height)`.
pub fn render_plane(plane: ArrayView2<'_, f32>, lat_ascending: bool) -> (Vec<u8>, usize, usize) {
    let (h, w) = plane.dim();
    let (lo, hi) = finite_range(&plane);
    let mut rgba = vec![0u8; w * h * 4];
    if w == 0 {
        return (rgba, w, h);
    }

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let i = if lat_ascending { h - 1 - y } else { y };
        for x in 0..w {
            let color = sea_color(plane[[i, x]], lo, hi);
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });

    (rgba, w, h)
}

/// Quick-look of one depth level and time step of a seascape.
pub fn render_window(
    window: &SeascapeWindow,
    depth: usize,
    time: usize,
) -> (Vec<u8>, usize, usize) {
    let rel = &window.coords.lat.relative;
    let ascending = rel.len() < 2 || rel[1] > rel[0];
    render_plane(window.plane(depth, time), ascending)
}

/// Whole-field quick-look with each point marked by a small cross.
pub fn render_field(
    grid: &RegularGrid,
    depth: usize,
    time: usize,
    points: &[Point],
) -> (Vec<u8>, usize, usize) {
    let plane = grid.values().slice(s![.., .., depth, time]);
    let ascending = grid.lat().is_ascending();
    let (mut rgba, w, h) = render_plane(plane, ascending);

    for p in points {
        let i = grid.lat().nearest(p.lat);
        let x = grid.lon().nearest(p.lon) as isize;
        let row = if ascending { h - 1 - i } else { i };
        let y = row as isize;
        for d in -2isize..=2 {
            for (px, py) in [(x + d, y + d), (x + d, y - d)] {
                if px >= 0 && py >= 0 && (px as usize) < w && (py as usize) < h {
                    let o = (py as usize * w + px as usize) * 4;
                    rgba[o..o + 4].copy_from_slice(&MARKER);
                }
            }
        }
    }
    (rgba, w, h)
}
