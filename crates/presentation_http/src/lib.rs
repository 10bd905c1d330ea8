//! METAR sensors HTTP presentation layer
//!
//! Exposes sensors and station config entries over a JSON API.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
