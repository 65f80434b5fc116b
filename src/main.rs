use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::TimeDelta;
use clap::Parser;
use tracing::info;

use seascape::config::{FieldParams, SeascapeParams};
use seascape::point::Point;
use seascape::{SeascapeAssembler, SeascapeSelector, render, synth};

/// Cut seascapes around random points on a synthetic ocean field.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of random points.
    #[arg(long, default_value_t = 20)]
    points: usize,

    /// Seascape side length in degrees.
    #[arg(long)]
    size: Option<f64>,

    /// Seascape time range in hours; gives the field a daily time axis.
    #[arg(long)]
    time_range_hours: Option<i64>,

    /// Days in the synthetic field's time axis.
    #[arg(long, default_value_t = 30)]
    days: usize,

    /// Depth levels in the synthetic field, 0 for none.
    #[arg(long, default_value_t = 0)]
    depth_levels: usize,

    /// Keep the whole depth column.
    #[arg(long)]
    column: bool,

    /// JSON file with seascape parameters; flags override it.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Look up the seascape containing `LAT,LON`.
    #[arg(long, value_parser = parse_lat_lon)]
    query: Option<(f64, f64)>,

    /// Day of the field's time axis for the lookup.
    #[arg(long, default_value_t = 0)]
    query_day: i64,

    #[arg(long, default_value = "artifacts")]
    out: PathBuf,
}

fn parse_lat_lon(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s.split_once(',').ok_or("expected LAT,LON")?;
    let lat = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lon = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    Ok((lat, lon))
}

fn main() -> Result<(), Box<dyn Error>> {
    seascape::init_logging();
    let cli = Cli::parse();

    let mut params = match &cli.params {
        Some(path) => serde_json::from_str::<SeascapeParams>(&fs::read_to_string(path)?)?,
        None => SeascapeParams::default(),
    };
    if let Some(size) = cli.size {
        params.size_degrees = size;
    }
    if let Some(hours) = cli.time_range_hours {
        let range = TimeDelta::try_hours(hours)
            .ok_or_else(|| format!("time range of {hours} hours is out of range"))?;
        params = params.with_time_range(range);
    }
    params.include_depth |= cli.column;

    let field_params = FieldParams {
        days: if params.time_range_secs.is_some() { cli.days } else { 0 },
        depth_levels: cli.depth_levels,
        ..FieldParams::default()
    };
    let grid = synth::synthetic_field(&field_params, cli.seed)?;
    info!(
        lat = grid.lat().len(),
        lon = grid.lon().len(),
        days = field_params.days,
        depth = field_params.depth_levels,
        "synthetic field ready"
    );

    // Keep points far enough from the edges for their windows to fit.
    let margin = params.size_degrees / 2.0 + field_params.resolution;
    let time_range = grid.time().map(|axis| {
        let stamps = axis.stamps();
        (stamps[0], stamps[stamps.len() - 1])
    });
    let time_margin = params.time_range()?.unwrap_or_else(TimeDelta::zero) / 2 + TimeDelta::days(1);
    let points = synth::generate_points(
        cli.points,
        (field_params.min_lat + margin, field_params.max_lat - margin),
        (field_params.min_lon + margin, field_params.max_lon - margin),
        time_range.map(|(start, end)| {
            (
                start.checked_add_signed(time_margin).unwrap_or(end),
                end.checked_sub_signed(time_margin).unwrap_or(start),
            )
        }),
        cli.seed,
    );

    let assembler = SeascapeAssembler::new(params);
    let (collection, timings) = assembler.assemble_timed(&points, &grid)?;

    println!("\nTimings:");
    for t in &timings {
        println!("  {:20} {:8.1} ms", t.name, t.ms);
    }
    println!(
        "\n{} points -> {} seascapes of {}x{} cells",
        points.len(),
        collection.len(),
        2 * collection.half_width() + 1,
        2 * collection.half_width() + 1
    );

    fs::create_dir_all(&cli.out)?;
    let save = |name: &str, rgba: &[u8], w: usize, h: usize| -> Result<(), Box<dyn Error>> {
        let path = cli.out.join(name);
        image::save_buffer(&path, rgba, w as u32, h as u32, image::ColorType::Rgba8)?;
        info!(path = %path.display(), "saved");
        Ok(())
    };

    let (rgba, w, h) = render::render_field(&grid, 0, 0, &points);
    save("field.png", &rgba, w, h)?;
    for (i, window) in collection.windows().iter().enumerate() {
        let (_, _, _, n_time) = window.values.dim();
        let (rgba, w, h) = render::render_window(window, 0, n_time / 2);
        save(&format!("seascape_{i:03}.png"), &rgba, w, h)?;
    }

    let json_path = cli.out.join("seascapes.json");
    fs::write(&json_path, serde_json::to_string(&collection)?)?;
    info!(path = %json_path.display(), "saved");

    if let Some((lat, lon)) = cli.query {
        let p = Point {
            lat,
            lon,
            time: time_range.map(|(start, _)| start + TimeDelta::days(cli.query_day)),
        };
        match SeascapeSelector::new(&collection).select_index(&p) {
            Ok(i) => {
                let w = &collection.windows()[i];
                println!(
                    "query ({lat}, {lon}) -> seascape {i} centered at ({}, {})",
                    w.center_lat, w.center_lon
                );
            }
            Err(e) => println!("query ({lat}, {lon}): {e}"),
        }
    }

    Ok(())
}
