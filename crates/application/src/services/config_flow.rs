//! Config and options flow
//!
//! Creates one config entry per station and edits its options afterwards.
//! Entry data is never rewritten; changes go into the options.

use std::sync::Arc;

use domain::{ConfigEntry, StationCode, StationConfig, UpdateInterval};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApplicationError, ports::ConfigEntryStore};

/// Input of the user step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// ICAO station code, any case
    pub station: String,
    /// Optional polling interval in minutes
    #[serde(default)]
    pub update_interval: Option<u32>,
}

/// Input of the options step; omitted fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsInput {
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub update_interval: Option<u32>,
}

/// Config flow backed by a [`ConfigEntryStore`]
pub struct ConfigFlow {
    store: Arc<dyn ConfigEntryStore>,
}

impl std::fmt::Debug for ConfigFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFlow")
            .field("store", &"<ConfigEntryStore>")
            .finish()
    }
}

impl ConfigFlow {
    #[must_use]
    pub fn new(store: Arc<dyn ConfigEntryStore>) -> Self {
        Self { store }
    }

    /// Validate user input and create a config entry
    ///
    /// # Errors
    ///
    /// - `Domain` if the station code or interval is invalid
    /// - `AlreadyConfigured` if an entry already uses the station, either
    ///   as its id or as its station in effect
    #[instrument(skip(self, input), fields(station = %input.station))]
    pub async fn step_user(&self, input: UserInput) -> Result<ConfigEntry, ApplicationError> {
        let station = StationCode::new(input.station)?;
        let update_interval = input
            .update_interval
            .map(UpdateInterval::new)
            .transpose()?;

        let entry = ConfigEntry::new(StationConfig {
            station,
            update_interval,
        });
        if !self.store.insert_unique(&entry).await? {
            return Err(ApplicationError::AlreadyConfigured(entry.station().to_string()));
        }

        info!(entry_id = %entry.entry_id, "Created config entry");
        Ok(entry)
    }

    /// Store new options for an entry
    ///
    /// The station defaults to the entry's effective station.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the entry does not exist
    /// - `Domain` if the station code or interval is invalid
    /// - `AlreadyConfigured` if another entry already polls the station
    #[instrument(skip(self, input))]
    pub async fn step_options(
        &self,
        entry_id: &str,
        input: OptionsInput,
    ) -> Result<ConfigEntry, ApplicationError> {
        let mut entry = self.get(entry_id).await?;

        let station = match input.station {
            Some(code) => StationCode::new(code)?,
            None => entry.station().clone(),
        };
        let update_interval = match input.update_interval {
            Some(minutes) => Some(UpdateInterval::new(minutes)?),
            None => entry.options.update_interval,
        };

        let taken = self
            .store
            .list()
            .await?
            .iter()
            .any(|other| other.entry_id != entry.entry_id && *other.station() == station);
        if taken {
            return Err(ApplicationError::AlreadyConfigured(station.to_string()));
        }

        entry.options.station = Some(station);
        entry.options.update_interval = update_interval;
        self.store.save(&entry).await?;

        info!(
            entry_id = %entry.entry_id,
            station = %entry.station(),
            "Updated config entry options"
        );
        Ok(entry)
    }

    /// Remove an entry
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    #[instrument(skip(self))]
    pub async fn remove(&self, entry_id: &str) -> Result<(), ApplicationError> {
        if self.store.delete(entry_id).await? {
            info!("Removed config entry");
            Ok(())
        } else {
            Err(not_found(entry_id))
        }
    }

    /// Look up an entry
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    pub async fn get(&self, entry_id: &str) -> Result<ConfigEntry, ApplicationError> {
        self.store
            .get(entry_id)
            .await?
            .ok_or_else(|| not_found(entry_id))
    }

    /// All entries
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn entries(&self) -> Result<Vec<ConfigEntry>, ApplicationError> {
        self.store.list().await
    }
}

fn not_found(entry_id: &str) -> ApplicationError {
    ApplicationError::NotFound(format!("config entry {entry_id}"))
}
