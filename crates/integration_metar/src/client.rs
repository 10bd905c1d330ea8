//! NOAA METAR client
//!
//! HTTP client for the NOAA station bulletin files.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use domain::{ParsedObservation, StationCode};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{bulletin::RawBulletin, observation::parse_bulletin};

/// METAR client errors
#[derive(Debug, Error)]
pub enum MetarError {
    /// Connection to the bulletin server failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Request failed with an unexpected status or transport error
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// No bulletin is published for the station
    #[error("Station not found: {0}")]
    StationNotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The body is not a banner line followed by a METAR line
    #[error("Malformed bulletin: {0}")]
    MalformedBulletin(String),

    /// The METAR line could not be decoded
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
}

impl MetarError {
    /// Whether a later poll may succeed without configuration changes
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout(_)
                | Self::RateLimitExceeded
                | Self::ServiceUnavailable(_)
        )
    }
}

/// METAR service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetarConfig {
    /// Station bulletin directory
    /// (default: <https://tgftp.nws.noaa.gov/data/observations/metar/stations>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://tgftp.nws.noaa.gov/data/observations/metar/stations".to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for MetarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// METAR client trait for fetching station bulletins
#[async_trait]
pub trait MetarClient: Send + Sync {
    /// Fetch the raw bulletin for a station
    async fn fetch_bulletin(&self, station: &StationCode) -> Result<RawBulletin, MetarError>;

    /// Fetch and decode the latest observation for a station
    async fn fetch_observation(
        &self,
        station: &StationCode,
    ) -> Result<ParsedObservation, MetarError> {
        let bulletin = self.fetch_bulletin(station).await?;
        parse_bulletin(&bulletin, Utc::now())
    }
}

/// NOAA HTTP client implementation
#[derive(Debug)]
pub struct NoaaMetarClient {
    client: Client,
    config: MetarConfig,
}

impl NoaaMetarClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: MetarConfig) -> Result<Self, MetarError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MetarError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, MetarError> {
        Self::new(MetarConfig::default())
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &MetarConfig {
        &self.config
    }

    /// Bulletin URL for a station
    fn station_url(&self, station: &StationCode) -> String {
        format!(
            "{}/{}.TXT",
            self.config.base_url.trim_end_matches('/'),
            station
        )
    }

    fn map_transport_error(&self, error: &reqwest::Error) -> MetarError {
        if error.is_timeout() {
            MetarError::Timeout(self.config.timeout_secs)
        } else if error.is_connect() {
            MetarError::ConnectionFailed(error.to_string())
        } else {
            MetarError::RequestFailed(error.to_string())
        }
    }

    fn check_status(status: StatusCode, station: &StationCode) -> Result<(), MetarError> {
        if status == StatusCode::NOT_FOUND {
            return Err(MetarError::StationNotFound(station.to_string()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MetarError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(MetarError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if status != StatusCode::OK {
            return Err(MetarError::RequestFailed(format!("HTTP {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl MetarClient for NoaaMetarClient {
    #[instrument(skip(self), fields(station = %station))]
    async fn fetch_bulletin(&self, station: &StationCode) -> Result<RawBulletin, MetarError> {
        let url = self.station_url(station);
        debug!(url = %url, "Fetching METAR bulletin");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        Self::check_status(response.status(), station)?;

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        RawBulletin::parse(&body)
    }
}
