//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Sensors (v1)
        .route("/v1/sensors", get(handlers::sensors::list_sensors))
        .route("/v1/sensors/{unique_id}", get(handlers::sensors::get_sensor))
        // Stations (v1)
        .route(
            "/v1/stations",
            get(handlers::stations::list_stations).post(handlers::stations::create_station),
        )
        .route(
            "/v1/stations/{entry_id}",
            get(handlers::stations::get_station)
                .patch(handlers::stations::update_station)
                .delete(handlers::stations::delete_station),
        )
        .route(
            "/v1/stations/{entry_id}/refresh",
            post(handlers::stations::refresh_station),
        )
        // Attach state
        .with_state(state)
}
