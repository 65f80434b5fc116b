use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use seascape::config::{FieldParams, SeascapeParams};
use seascape::point::Point;
use seascape::{SeascapeAssembler, SeascapeError, SeascapeSelector, render, synth};

#[derive(Deserialize)]
struct SeascapeRequest {
    seed: Option<u64>,
    /// Explicit points; random points are generated when absent.
    points: Option<Vec<Point>>,
    num_points: Option<usize>,
    #[serde(default)]
    params: SeascapeParams,
    field: Option<FieldParams>,
    /// Point to look up in the assembled seascapes.
    query: Option<Point>,
}

#[derive(Serialize)]
struct SeascapeResponse {
    variable: String,
    half_width: usize,
    time_half_width: Option<usize>,
    points: Vec<Point>,
    point_to_window: Vec<usize>,
    windows: Vec<WindowSummary>,
    field: Layer,
    selected: Option<usize>,
    selection_error: Option<String>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct WindowSummary {
    center_lat: f64,
    center_lon: f64,
    center_time: Option<DateTime<Utc>>,
    center_value: f32,
    data_url: String,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    width: usize,
    height: usize,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

type ApiError = (StatusCode, String);

/// Largest synthetic field a request may ask for, in values.
const MAX_FIELD_CELLS: f64 = 20_000_000.0;
const MAX_POINTS: usize = 10_000;

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, ApiError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder
        .write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("PNG encode failed: {e}")))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn bad_request(e: SeascapeError) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
}

/// Reject requests whose field or point set would be too large to build.
fn check_limits(field: &FieldParams, num_points: usize) -> Result<(), ApiError> {
    let cells = field.cell_count();
    if !(cells <= MAX_FIELD_CELLS) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("field of {cells} values exceeds the limit of {MAX_FIELD_CELLS}"),
        ));
    }
    if num_points > MAX_POINTS {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("{num_points} points exceed the limit of {MAX_POINTS}"),
        ));
    }
    Ok(())
}

fn build(req: SeascapeRequest) -> Result<SeascapeResponse, ApiError> {
    let seed = req.seed.unwrap_or(42);
    let params = req.params;
    let mut field_params = req.field.unwrap_or_default();
    if params.time_range_secs.is_some() && field_params.days == 0 {
        field_params.days = 30;
    }
    let num_points = req
        .points
        .as_ref()
        .map_or(req.num_points.unwrap_or(20), Vec::len);
    check_limits(&field_params, num_points)?;

    let grid = synth::synthetic_field(&field_params, seed).map_err(bad_request)?;

    let points = match req.points {
        Some(points) => points,
        None => {
            let margin = params.size_degrees / 2.0 + field_params.resolution;
            let time_margin = params
                .time_range()
                .map_err(bad_request)?
                .unwrap_or_else(TimeDelta::zero)
                / 2
                + TimeDelta::days(1);
            let time_range = grid.time().map(|axis| {
                let (start, end) = (axis.stamps()[0], axis.stamps()[axis.len() - 1]);
                (
                    start.checked_add_signed(time_margin).unwrap_or(end),
                    end.checked_sub_signed(time_margin).unwrap_or(start),
                )
            });
            synth::generate_points(
                num_points,
                (field_params.min_lat + margin, field_params.max_lat - margin),
                (field_params.min_lon + margin, field_params.max_lon - margin),
                time_range,
                seed,
            )
        }
    };

    let (collection, timings) = SeascapeAssembler::new(params)
        .assemble_timed(&points, &grid)
        .map_err(bad_request)?;

    let windows = collection
        .windows()
        .iter()
        .map(|w| {
            let (_, _, _, n_time) = w.values.dim();
            let (rgba, width, height) = render::render_window(w, 0, n_time / 2);
            Ok(WindowSummary {
                center_lat: w.center_lat,
                center_lon: w.center_lon,
                center_time: w.center_time,
                center_value: w.center_value(),
                data_url: encode_png(&rgba, width, height)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let (rgba, width, height) = render::render_field(&grid, 0, 0, &points);
    let field = Layer {
        name: grid.name().to_string(),
        width,
        height,
        data_url: encode_png(&rgba, width, height)?,
    };

    let (selected, selection_error) = match req.query {
        Some(q) => match SeascapeSelector::new(&collection).select_index(&q) {
            Ok(i) => (Some(i), None),
            Err(e) => (None, Some(e.to_string())),
        },
        None => (None, None),
    };

    Ok(SeascapeResponse {
        variable: collection.name().to_string(),
        half_width: collection.half_width(),
        time_half_width: collection.time_half_width(),
        point_to_window: collection.point_to_window().to_vec(),
        points,
        windows,
        field,
        selected,
        selection_error,
        timings: timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect(),
    })
}

async fn seascapes_handler(
    Json(req): Json<SeascapeRequest>,
) -> Result<Json<SeascapeResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || build(req))
        .await
        .map_err(|e| {
            error!(error = %e, "seascape task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })??;
    Ok(Json(response))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    seascape::init_logging();

    let app = Router::new()
        .route("/api/seascapes", post(seascapes_handler))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("seascape server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
