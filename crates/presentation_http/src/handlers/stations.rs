//! Station (config entry) handlers
//!
//! Creating or editing an entry goes through the config flow first and then
//! reloads the entry in the station manager.

use application::{OptionsInput, StationStatus, UserInput};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

fn loaded(state: &AppState, entry_id: &str) -> Result<StationStatus, ApiError> {
    state
        .manager
        .station_status(entry_id)
        .ok_or_else(|| ApiError::NotFound(format!("station {entry_id}")))
}

/// List every loaded station
pub async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationStatus>> {
    Json(state.manager.stations())
}

/// Add a station
#[instrument(skip_all, fields(station = %input.station))]
pub async fn create_station(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<StationStatus>), ApiError> {
    let entry = state.flow.step_user(input).await?;
    let entry_id = entry.entry_id.clone();
    state.manager.setup_entry(entry).await;

    Ok((StatusCode::CREATED, Json(loaded(&state, &entry_id)?)))
}

/// Get one station
pub async fn get_station(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<StationStatus>, ApiError> {
    loaded(&state, &entry_id).map(Json)
}

/// Change station options and reload the entry
#[instrument(skip_all, fields(entry_id = %entry_id))]
pub async fn update_station(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(input): Json<OptionsInput>,
) -> Result<Json<StationStatus>, ApiError> {
    state.flow.step_options(&entry_id, input).await?;
    state.manager.reload_entry(&entry_id).await?;
    loaded(&state, &entry_id).map(Json)
}

/// Remove a station and stop its polling
#[instrument(skip_all, fields(entry_id = %entry_id))]
pub async fn delete_station(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.flow.remove(&entry_id).await?;
    state.manager.unload_entry(&entry_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Poll a station now
#[instrument(skip_all, fields(entry_id = %entry_id))]
pub async fn refresh_station(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<StationStatus>, ApiError> {
    Ok(Json(state.manager.refresh(&entry_id).await?))
}
