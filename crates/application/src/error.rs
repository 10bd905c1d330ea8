//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A coordinator poll failed; cached data is kept
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// The upstream answered, but with something that cannot be used
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Requested entry, station or sensor does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A config entry with the same unique id exists
    #[error("Already configured: {0}")]
    AlreadyConfigured(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::UpdateFailed(_) | Self::ExternalService(_))
    }
}
