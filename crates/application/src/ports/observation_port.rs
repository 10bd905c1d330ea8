//! Observation source port
//!
//! Defines the interface for fetching and decoding the latest METAR
//! observation of a station.

use async_trait::async_trait;
use domain::{ParsedObservation, StationCode};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for fetching the current observation of a station
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObservationPort: Send + Sync {
    /// Fetch the bulletin for `station` and decode it
    ///
    /// Fields missing from the report are `Unknown`, never errors.
    async fn fetch_observation(
        &self,
        station: &StationCode,
    ) -> Result<ParsedObservation, ApplicationError>;
}
