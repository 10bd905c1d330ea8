//! Application layer - Use cases and orchestration
//!
//! Contains the config flow, update coordinator, sensor entities and the
//! station manager that wires them together, plus the ports adapters
//! implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
