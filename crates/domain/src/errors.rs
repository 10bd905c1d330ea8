//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Invalid ICAO station identifier
    #[error("Invalid station code: {0}")]
    InvalidStationCode(String),

    /// Polling interval outside the allowed range
    #[error("Invalid update interval: {0}")]
    InvalidUpdateInterval(String),
}
