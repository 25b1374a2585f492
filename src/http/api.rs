//! Vehicle REST API, mounted under `/api/vehicle`.
//!
//! Commands answer with a short plain-text acknowledgement; queries answer
//! with JSON. Bad or missing query parameters yield 400 with a JSON error.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::storage::VehicleRecord;
use crate::vehicle::VehicleStatus;

const DEFAULT_RECENT_LIMIT: usize = 100;

type Params<T> = Result<Query<T>, QueryRejection>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/simulation/start", post(start_simulation))
        .route("/simulation/stop", post(stop_simulation))
        .route("/media/toggle", post(toggle_media))
        .route("/media/volume", post(set_volume))
        .route("/climate/temperature", post(set_temperature))
        .route("/climate/fan", post(set_fan_speed))
        .route("/climate/mode", post(toggle_climate_mode))
        .route("/data/recent", get(recent_data))
        .route("/data/period", get(period_data))
        .route("/data/statistics", get(statistics))
}

async fn get_status(State(state): State<AppState>) -> Json<VehicleStatus> {
    Json(VehicleStatus::clone(&state.simulator.current_status()))
}

async fn start_simulation(State(state): State<AppState>) -> &'static str {
    state.simulator.start(Utc::now());
    "Simulation started"
}

async fn stop_simulation(State(state): State<AppState>) -> &'static str {
    state.simulator.stop();
    "Simulation stopped"
}

async fn toggle_media(State(state): State<AppState>) -> &'static str {
    state.simulator.toggle_play_pause();
    "Media toggled"
}

#[derive(Debug, Deserialize)]
struct VolumeParams {
    volume: i32,
}

async fn set_volume(State(state): State<AppState>, params: Params<VolumeParams>) -> Result<String, ApiError> {
    let Query(VolumeParams { volume }) = params?;
    state.simulator.set_volume(volume);
    Ok(format!("Volume set to {volume}"))
}

#[derive(Debug, Deserialize)]
struct TemperatureParams {
    temperature: f64,
}

async fn set_temperature(
    State(state): State<AppState>,
    params: Params<TemperatureParams>,
) -> Result<String, ApiError> {
    let Query(TemperatureParams { temperature }) = params?;
    if !temperature.is_finite() {
        return Err(ApiError::BadRequest("temperature must be a finite number".into()));
    }
    state.simulator.set_climate_temperature(temperature);
    Ok(format!("Temperature set to {temperature:?}"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FanParams {
    fan_speed: i32,
}

async fn set_fan_speed(State(state): State<AppState>, params: Params<FanParams>) -> Result<String, ApiError> {
    let Query(FanParams { fan_speed }) = params?;
    state.simulator.set_climate_fan_speed(fan_speed);
    Ok(format!("Fan speed set to {fan_speed}"))
}

async fn toggle_climate_mode(State(state): State<AppState>) -> &'static str {
    state.simulator.toggle_climate_mode();
    "Climate mode toggled"
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentParams {
    vehicle_id: Option<String>,
    limit: Option<usize>,
}

async fn recent_data(
    State(state): State<AppState>,
    params: Params<RecentParams>,
) -> Result<Json<Vec<VehicleRecord>>, ApiError> {
    let Query(params) = params?;
    let vehicle_id = params.vehicle_id.unwrap_or_else(|| state.simulator.vehicle_id());
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(state.simulator.recent_records(&vehicle_id, limit)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodParams {
    vehicle_id: Option<String>,
    start_time: String,
    end_time: String,
}

async fn period_data(
    State(state): State<AppState>,
    params: Params<PeriodParams>,
) -> Result<Json<Vec<VehicleRecord>>, ApiError> {
    let Query(params) = params?;
    let start = parse_timestamp("startTime", &params.start_time)?;
    let end = parse_timestamp("endTime", &params.end_time)?;
    if end < start {
        return Err(ApiError::BadRequest("endTime must not be before startTime".into()));
    }
    let vehicle_id = params.vehicle_id.unwrap_or_else(|| state.simulator.vehicle_id());
    Ok(Json(state.simulator.records_between(&vehicle_id, start, end)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsParams {
    vehicle_id: Option<String>,
    start_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub vehicle_id: String,
    pub start_time: String,
    pub average_speed: f64,
    pub total_distance: f64,
}

async fn statistics(
    State(state): State<AppState>,
    params: Params<StatisticsParams>,
) -> Result<Json<Statistics>, ApiError> {
    let Query(params) = params?;
    let start = parse_timestamp("startTime", &params.start_time)?;
    let vehicle_id = params.vehicle_id.unwrap_or_else(|| state.simulator.vehicle_id());

    let average_speed = state.simulator.average_speed_since(&vehicle_id, start)?;
    let total_distance = state.simulator.distance_since(&vehicle_id, start)?;

    Ok(Json(Statistics {
        vehicle_id,
        start_time: params.start_time,
        average_speed: average_speed.unwrap_or(0.0),
        total_distance: total_distance.unwrap_or(0.0),
    }))
}

/// Accepts RFC 3339 or a zone-less ISO-8601 timestamp (read as UTC).
fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ApiError::BadRequest(format!("{field}: '{value}' is not an ISO-8601 timestamp")))
}
