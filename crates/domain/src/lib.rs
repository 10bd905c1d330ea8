//! Domain layer for METAR sensors
//!
//! Contains the station, observation and sensor model shared by every other
//! crate. This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
