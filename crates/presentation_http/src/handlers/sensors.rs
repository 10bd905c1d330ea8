//! Sensor handlers

use application::SensorState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

/// Optional filters for the sensor list
#[derive(Debug, Default, Deserialize)]
pub struct SensorQuery {
    /// Only sensors of this config entry
    pub entry_id: Option<String>,
}

/// List sensors of every loaded station
pub async fn list_sensors(
    State(state): State<AppState>,
    Query(query): Query<SensorQuery>,
) -> Result<Json<Vec<SensorState>>, ApiError> {
    let Some(entry_id) = query.entry_id else {
        return Ok(Json(state.manager.sensors()));
    };

    state
        .manager
        .sensors_for(&entry_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("station {entry_id}")))
}

/// Get one sensor by unique id
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> Result<Json<SensorState>, ApiError> {
    state
        .manager
        .sensor(&unique_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("sensor {unique_id}")))
}
