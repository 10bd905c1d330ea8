//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer and provides
//! configuration loading and logging setup for the binaries.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, MetarAppConfig, PersistenceConfig, ServerConfig, TelemetryAppConfig};
pub use persistence::JsonEntryStore;
pub use telemetry::{TelemetryError, init_telemetry};
