//! Integration tests for seascape assembly and lookup.
//!
//! These cover:
//! 1. Window shape and center invariants on 2-D fields
//! 2. Deduplication of points sharing a cell
//! 3. Out-of-bounds and degenerate windows
//! 4. Round-trip lookup and containment rejection
//! 5. Time windows and depth columns

use approx::assert_abs_diff_eq;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use ndarray::{Array2, Array3, ArrayD, IxDyn};

use seascape::config::{FieldParams, SeascapeParams};
use seascape::{
    AxisName, Point, RegularGrid, SeascapeError, SeascapeSelector, assemble, select, synth,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, d, 0, 0, 0).unwrap()
}

fn axis_5() -> Vec<f64> {
    (-2..=2).map(f64::from).collect()
}

fn grid_2d() -> RegularGrid {
    let values = Array2::from_shape_fn((5, 5), |(i, j)| 15.0 + (i * 5 + j) as f32);
    RegularGrid::new("sst", axis_5(), axis_5(), values).unwrap()
}

fn daily_axis() -> Vec<DateTime<Utc>> {
    (1..=30).map(day).collect()
}

fn grid_3d() -> RegularGrid {
    let values = Array3::from_shape_fn((5, 5, 30), |(i, j, t)| (i * 1000 + j * 100 + t) as f32);
    RegularGrid::with_time("sst", axis_5(), axis_5(), daily_axis(), values).unwrap()
}

fn grid_4d() -> RegularGrid {
    let depth: Vec<f64> = (0..10).map(f64::from).collect();
    let values = ArrayD::from_shape_fn(IxDyn(&[5, 5, 10, 30]), |ix| (ix[2] * 100 + ix[3]) as f32);
    RegularGrid::from_parts("thetao", axis_5(), axis_5(), Some(depth), Some(daily_axis()), values)
        .unwrap()
}

/// Two points share the center pixel, one is off the grid.
fn sample_points() -> Vec<Point> {
    vec![
        Point::new(-3.0, -3.0),
        Point::new(-1.0, 1.0),
        Point::new(0.0, 0.0),
        Point::new(0.1, -0.1),
        Point::new(1.0, -1.0),
    ]
}

fn sample_points_with_time() -> Vec<Point> {
    vec![
        Point::at(-3.0, -3.0, day(4)),
        Point::at(-1.0, 1.0, day(4)),
        Point::at(0.0, 0.0, day(9)),
        Point::at(0.0, 0.0, day(13)),
        Point::at(0.1, -0.1, day(13)),
        Point::at(1.0, -1.0, day(19)),
    ]
}

// ============================================================================
// Window shape
// ============================================================================

#[test]
fn window_around_origin_on_5x5_grid() {
    let c = assemble(&[Point::new(0.0, 0.0)], &grid_2d(), &SeascapeParams::new(3.0)).unwrap();
    assert_eq!(c.len(), 1);

    let w = &c.windows()[0];
    assert_eq!((w.center.lat, w.center.lon), (2, 2));
    assert_eq!((w.center_lat, w.center_lon), (0.0, 0.0));
    assert_eq!(w.coords.lat.absolute, vec![-1.0, 0.0, 1.0]);
    assert_eq!(w.coords.lon.absolute, vec![-1.0, 0.0, 1.0]);
    assert_eq!(w.coords.lat.relative, vec![-1.0, 0.0, 1.0]);
    assert_eq!(w.coords.lon.relative, vec![-1.0, 0.0, 1.0]);
    assert_eq!(w.values.shape(), &[3, 3, 1, 1]);
    assert_eq!(w.center_value(), 15.0 + 12.0);
}

#[test]
fn windows_are_odd_and_centered() {
    let params = FieldParams {
        min_lat: 10.0,
        max_lat: 20.0,
        min_lon: 100.0,
        max_lon: 115.0,
        resolution: 0.25,
        ..FieldParams::default()
    };
    let grid = synth::synthetic_field(&params, 11).unwrap();
    let points = synth::generate_points(200, (12.0, 18.0), (102.0, 113.0), None, 5);

    let c = assemble(&points, &grid, &SeascapeParams::new(1.3)).unwrap();
    // ceil(1.3 / 0.25) = 6 -> 7 cells.
    assert_eq!(c.half_width(), 3);

    for w in c.windows() {
        for coords in [&w.coords.lat, &w.coords.lon] {
            assert_eq!(coords.len(), 2 * c.half_width() + 1);
            assert_eq!(coords.relative[c.half_width()], 0.0);
        }
        assert_eq!(w.coords.lat.absolute[3], grid.lat().value(w.center.lat));
        assert_eq!(w.coords.lon.absolute[3], grid.lon().value(w.center.lon));
        assert_abs_diff_eq!(w.coords.lat.relative[0], -0.75, epsilon = 1e-9);
        assert_abs_diff_eq!(w.coords.lon.relative[6], 0.75, epsilon = 1e-9);
    }
}

#[test]
fn single_pixel_seascapes() {
    let c = assemble(&sample_points(), &grid_2d(), &SeascapeParams::new(0.5)).unwrap();
    assert_eq!(c.len(), 4);
    for w in c.windows() {
        assert_eq!(w.values.shape(), &[1, 1, 1, 1]);
        assert_eq!(w.coords.lat.relative, vec![0.0]);
    }
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn points_in_the_same_cell_share_a_window() {
    let points = [Point::new(0.1, 0.1), Point::new(0.2, 0.2)];
    let c = assemble(&points, &grid_2d(), &SeascapeParams::new(3.0)).unwrap();
    assert_eq!(c.len(), 1);
    assert_eq!(c.point_to_window(), &[0, 0]);
}

#[test]
fn dedup_count_matches_distinct_cells() {
    let params = FieldParams {
        resolution: 0.5,
        ..FieldParams::default()
    };
    let grid = synth::synthetic_field(&params, 3).unwrap();
    let points = synth::generate_points(300, (33.0, 42.0), (-27.0, -13.0), None, 8);
    let c = assemble(&points, &grid, &SeascapeParams::new(2.0)).unwrap();

    let mut cells: Vec<(usize, usize)> = points
        .iter()
        .map(|p| (grid.lat().nearest(p.lat), grid.lon().nearest(p.lon)))
        .collect();
    let per_point = cells.clone();
    cells.sort_unstable();
    cells.dedup();

    assert!(c.len() <= points.len());
    assert_eq!(c.len(), cells.len());
    for (i, a) in per_point.iter().enumerate() {
        for (j, b) in per_point.iter().enumerate() {
            let same_window = c.point_to_window()[i] == c.point_to_window()[j];
            assert_eq!(a == b, same_window);
        }
    }
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn grid_edge_point_is_out_of_bounds() {
    let err = assemble(&[Point::new(2.0, 2.0)], &grid_2d(), &SeascapeParams::new(3.0)).unwrap_err();
    assert!(matches!(
        err,
        SeascapeError::OutOfBoundsWindow { center: 4, half_width: 1, len: 5, .. }
    ));
}

#[test]
fn one_bad_point_fails_the_whole_assembly() {
    let err = assemble(&sample_points(), &grid_2d(), &SeascapeParams::new(3.0)).unwrap_err();
    assert!(matches!(err, SeascapeError::OutOfBoundsWindow { center: 0, .. }));
}

#[test]
fn window_larger_than_grid_is_degenerate() {
    let err = assemble(&[Point::new(0.0, 0.0)], &grid_2d(), &SeascapeParams::new(6.0)).unwrap_err();
    assert!(matches!(
        err,
        SeascapeError::DegenerateGrid { len: 5, required: 7, .. }
    ));
}

#[test]
fn negative_size_is_rejected() {
    let err = assemble(&[Point::new(0.0, 0.0)], &grid_2d(), &SeascapeParams::new(-1.0)).unwrap_err();
    assert!(matches!(err, SeascapeError::InvalidWindowSize(_)));
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn every_input_point_selects_its_own_window() {
    let params = FieldParams {
        resolution: 0.3,
        ..FieldParams::default()
    };
    let grid = synth::synthetic_field(&params, 1).unwrap();
    let points = synth::generate_points(250, (32.0, 43.0), (-28.0, -12.0), None, 21);
    let c = assemble(&points, &grid, &SeascapeParams::new(1.0)).unwrap();
    let sel = SeascapeSelector::new(&c);

    for (i, p) in points.iter().enumerate() {
        assert_eq!(sel.select_index(p).unwrap(), c.point_to_window()[i], "point {i}");
    }
}

#[test]
fn cell_midpoints_select_their_own_window() {
    for step in [0.1, 0.25, 1.0 / 12.0, 0.2, 0.3] {
        let lat = synth::regular_axis(-30.0, -27.0, step);
        let lon = synth::regular_axis(170.0, 173.0, step);
        let grid = RegularGrid::new("sst", lat.clone(), lon.clone(), Array2::zeros((lat.len(), lon.len())))
            .unwrap();

        let mut points = Vec::new();
        for k in 1..lat.len() {
            for m in 1..lon.len() {
                let lat_mid = (lat[k - 1] + lat[k]) / 2.0;
                let lon_mid = (lon[m - 1] + lon[m]) / 2.0;
                points.push(Point::new(lat_mid, lon_mid));
                points.push(Point::new(lat_mid, lon[m]));
                points.push(Point::new(lat[k], lon_mid));
            }
        }

        let c = assemble(&points, &grid, &SeascapeParams::new(0.0)).unwrap();
        let sel = SeascapeSelector::new(&c);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(
                sel.select_index(p).unwrap(),
                c.point_to_window()[i],
                "step {step}, point ({}, {})",
                p.lat,
                p.lon
            );
        }
    }
}

#[test]
fn lookup_on_descending_latitude() {
    let lat: Vec<f64> = (0..9).map(|i| 4.0 - i as f64 * 0.5).collect();
    let lon: Vec<f64> = (0..9).map(|i| i as f64 * 0.5).collect();
    let grid = RegularGrid::new("sst", lat, lon, Array2::zeros((9, 9))).unwrap();
    let points = [Point::new(2.1, 1.4), Point::new(1.25, 2.75), Point::new(2.9, 2.0)];
    let c = assemble(&points, &grid, &SeascapeParams::new(1.0)).unwrap();

    assert_eq!(c.windows()[0].coords.lat.absolute, vec![2.5, 2.0, 1.5]);
    assert_eq!(c.windows()[0].coords.lat.relative, vec![0.5, 0.0, -0.5]);
    for (i, p) in points.iter().enumerate() {
        assert_eq!(SeascapeSelector::new(&c).select_index(p).unwrap(), c.point_to_window()[i]);
    }
}

#[test]
fn point_outside_every_center_cell_is_rejected() {
    let c = assemble(&sample_points(), &grid_2d(), &SeascapeParams::new(0.5)).unwrap();

    let w = select(&c, &sample_points()[2]).unwrap();
    assert_eq!((w.center_lat, w.center_lon), (0.0, 0.0));

    // Snapped to the (-2, -2) corner during assembly, but outside its cell.
    let err = select(&c, &sample_points()[0]).unwrap_err();
    assert!(matches!(err, SeascapeError::PointNotInAnySeascape { .. }));

    // Nearest center is (0, 0), but (0.4, 0.6) lies in cell (0, 1).
    assert!(select(&c, &Point::new(0.4, 0.6)).is_err());
}

// ============================================================================
// Time and depth
// ============================================================================

#[test]
fn time_windows_single_pixel() {
    let params = SeascapeParams::new(0.5).with_time_range(TimeDelta::hours(60));
    let points = sample_points_with_time();
    let c = assemble(&points, &grid_3d(), &params).unwrap();

    assert_eq!(c.len(), 5);
    assert_eq!(c.time_half_width(), Some(1));
    assert_eq!(c.point_to_window(), &[0, 1, 2, 3, 3, 4]);
    for w in c.windows() {
        assert_eq!(w.values.shape(), &[1, 1, 1, 3]);
    }

    let w = select(&c, &points[2]).unwrap();
    assert_eq!((w.center_lat, w.center_lon), (0.0, 0.0));
    assert_eq!(w.center_time, Some(day(9)));
    let time = w.coords.time.as_ref().unwrap();
    assert_eq!(time.absolute, vec![day(8), day(9), day(10)]);
    assert_eq!(time.relative, vec![TimeDelta::days(-1), TimeDelta::zero(), TimeDelta::days(1)]);
    assert_eq!(w.values[[0, 0, 0, 1]], (2 * 1000 + 2 * 100 + 8) as f32);

    assert!(select(&c, &points[0]).is_err());
    assert!(select(&c, &Point::at(-3.0, -3.0, day(14))).is_err());
}

#[test]
fn time_windows_multi_pixel() {
    let params = SeascapeParams::new(2.0).with_time_range(TimeDelta::hours(60));
    let points = &sample_points_with_time()[1..];
    let c = assemble(points, &grid_3d(), &params).unwrap();

    assert_eq!(c.len(), 4);
    for w in c.windows() {
        assert_eq!(w.values.shape(), &[3, 3, 1, 3]);
    }
    for (i, p) in points.iter().enumerate() {
        assert_eq!(SeascapeSelector::new(&c).select_index(p).unwrap(), c.point_to_window()[i]);
    }

    // Same spatial cell as a window, but a day no window was cut around.
    let err = select(&c, &Point::at(0.0, 0.0, day(14))).unwrap_err();
    assert!(matches!(err, SeascapeError::PointNotInAnySeascape { .. }));
}

#[test]
fn time_window_past_the_axis_start() {
    let params = SeascapeParams::new(0.5).with_time_range(TimeDelta::hours(60));
    let err = assemble(&[Point::at(0.0, 0.0, day(1))], &grid_3d(), &params).unwrap_err();
    assert!(matches!(
        err,
        SeascapeError::OutOfBoundsWindow { axis: AxisName::Time, center: 0, .. }
    ));
}

#[test]
fn time_axis_without_time_range_is_an_error() {
    let err = assemble(&sample_points_with_time(), &grid_3d(), &SeascapeParams::new(2.0)).unwrap_err();
    assert!(matches!(err, SeascapeError::MissingTimeRange));
}

#[test]
fn depth_column_is_kept_whole() {
    let params = SeascapeParams::new(2.0)
        .with_time_range(TimeDelta::hours(60))
        .with_depth(true);
    let points = &sample_points_with_time()[1..];
    let c = assemble(points, &grid_4d(), &params).unwrap();

    assert_eq!(c.len(), 4);
    let w = select(&c, &points[1]).unwrap();
    assert_eq!(w.values.shape(), &[3, 3, 10, 3]);
    assert_eq!(w.coords.depth.as_ref().map(Vec::len), Some(10));
    assert_eq!(w.center_time, Some(day(9)));
    assert_eq!(w.values[[1, 1, 9, 1]], (9 * 100 + 8) as f32);
}

#[test]
fn surface_is_selected_without_depth_column() {
    let params = SeascapeParams::new(2.0).with_time_range(TimeDelta::hours(60));
    let points = &sample_points_with_time()[1..];
    let c = assemble(points, &grid_4d(), &params).unwrap();

    let w = &c.windows()[0];
    assert_eq!(w.values.shape(), &[3, 3, 1, 3]);
    assert!(w.coords.depth.is_none());
    assert_eq!(w.values[[1, 1, 0, 1]], 3.0);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn collection_serializes_to_json() {
    let params = SeascapeParams::new(0.5).with_time_range(TimeDelta::hours(60));
    let c = assemble(&sample_points_with_time(), &grid_3d(), &params).unwrap();
    let json: serde_json::Value = serde_json::to_value(&c).unwrap();

    assert_eq!(json["name"], "sst");
    assert_eq!(json["windows"].as_array().unwrap().len(), 5);
    assert_eq!(json["point_to_window"][4], 3);
    assert_eq!(
        json["windows"][2]["coords"]["time"]["relative"],
        serde_json::json!([-86400, 0, 86400])
    );
}
