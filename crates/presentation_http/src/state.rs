//! Application state shared across handlers

use std::sync::Arc;

use application::{
    ApplicationError, ConfigFlow, ManagerSettings, StationManager, UserInput,
    ports::{ConfigEntryStore, ObservationPort},
};
use domain::StationCode;
use tracing::{debug, info};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Runtime of every loaded config entry
    pub manager: Arc<StationManager>,
    /// Creates and edits config entries
    pub flow: Arc<ConfigFlow>,
}

impl AppState {
    /// Wire the config flow and station manager around one entry store
    #[must_use]
    pub fn new(
        store: Arc<dyn ConfigEntryStore>,
        port: Arc<dyn ObservationPort>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            manager: Arc::new(StationManager::new(Arc::clone(&store), port, settings)),
            flow: Arc::new(ConfigFlow::new(store)),
        }
    }

    /// Create entries for configured stations that have none yet
    ///
    /// Returns the number of entries created. Entries are only stored; call
    /// [`StationManager::setup_all`] afterwards to load them.
    pub async fn seed_stations(&self, stations: &[StationCode]) -> Result<usize, ApplicationError> {
        let mut created = 0;
        for station in stations {
            let input = UserInput {
                station: station.to_string(),
                update_interval: None,
            };
            match self.flow.step_user(input).await {
                Ok(entry) => {
                    info!(entry_id = %entry.entry_id, "Seeded station from configuration");
                    created += 1;
                },
                Err(ApplicationError::AlreadyConfigured(_)) => {
                    debug!(%station, "Station already configured");
                },
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }
}
