//! Station manager
//!
//! Sets up and tears down the runtime for each config entry: one
//! coordinator, its polling task and the sensors reading from it.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use domain::{ConfigEntry, ParsedObservation, StationCode, UpdateInterval};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use super::{
    sensor::{MetarSensor, SensorState},
    update_coordinator::{CoordinatorConfig, CoordinatorStats, UpdateCoordinator},
};
use crate::{
    error::ApplicationError,
    ports::{ConfigEntryStore, ObservationPort},
};

/// Defaults applied to entries without overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerSettings {
    pub default_interval: UpdateInterval,
    /// HTTP timeout of the observation source
    pub fetch_timeout: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            default_interval: UpdateInterval::default(),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Summary of one loaded entry
#[derive(Debug, Clone, Serialize)]
pub struct StationStatus {
    pub entry: ConfigEntry,
    pub station: StationCode,
    pub update_interval_minutes: u32,
    pub available: bool,
    pub last_update_success: bool,
    pub stats: CoordinatorStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<ParsedObservation>,
}

struct LoadedEntry {
    entry: ConfigEntry,
    interval: UpdateInterval,
    coordinator: Arc<UpdateCoordinator>,
    sensors: Vec<MetarSensor>,
    task: JoinHandle<()>,
}

impl LoadedEntry {
    fn status(&self) -> StationStatus {
        let observation = self.coordinator.data();
        StationStatus {
            entry: self.entry.clone(),
            station: self.coordinator.station().clone(),
            update_interval_minutes: self.interval.minutes(),
            available: observation.is_some(),
            last_update_success: self.coordinator.last_update_success(),
            stats: self.coordinator.stats(),
            observation: observation.map(|obs| (*obs).clone()),
        }
    }
}

/// Owns the runtime of every loaded config entry
pub struct StationManager {
    store: Arc<dyn ConfigEntryStore>,
    port: Arc<dyn ObservationPort>,
    settings: ManagerSettings,
    entries: RwLock<BTreeMap<String, LoadedEntry>>,
}

impl std::fmt::Debug for StationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationManager")
            .field("settings", &self.settings)
            .field("entries", &self.entries.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl StationManager {
    #[must_use]
    pub fn new(
        store: Arc<dyn ConfigEntryStore>,
        port: Arc<dyn ObservationPort>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            store,
            port,
            settings,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Set up an entry: coordinator, first refresh, sensors, polling task
    ///
    /// A failed first refresh is logged; the entry is still set up and its
    /// sensors stay unavailable until a poll succeeds. An entry that is
    /// already loaded is replaced.
    #[instrument(skip(self, entry), fields(entry_id = %entry.entry_id))]
    pub async fn setup_entry(&self, entry: ConfigEntry) {
        self.unload_entry(&entry.entry_id);

        let interval = entry.update_interval(self.settings.default_interval);
        let coordinator = Arc::new(UpdateCoordinator::new(
            entry.station().clone(),
            Arc::clone(&self.port),
            CoordinatorConfig::new(interval, self.settings.fetch_timeout),
        ));

        if let Err(e) = coordinator.first_refresh().await {
            warn!(error = %e, "First refresh failed, sensors unavailable until next poll");
        }

        let sensors = MetarSensor::for_coordinator(&coordinator);
        let task = coordinator.spawn_polling();

        info!(
            station = %coordinator.station(),
            interval = %interval,
            sensors = sensors.len(),
            "Config entry set up"
        );

        let loaded = LoadedEntry {
            entry,
            interval,
            coordinator,
            sensors,
            task,
        };
        let previous = self
            .entries
            .write()
            .insert(loaded.entry.entry_id.clone(), loaded);
        // Another setup for the same entry finished first
        if let Some(previous) = previous {
            previous.task.abort();
        }
    }

    /// Stop polling and drop the sensors of an entry
    ///
    /// # Returns
    /// true if the entry was loaded
    pub fn unload_entry(&self, entry_id: &str) -> bool {
        let Some(loaded) = self.entries.write().remove(entry_id) else {
            return false;
        };
        loaded.task.abort();
        info!(entry_id, "Config entry unloaded");
        true
    }

    /// Unload and set up again from the stored entry
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry is no longer stored.
    pub async fn reload_entry(&self, entry_id: &str) -> Result<(), ApplicationError> {
        let entry = self
            .store
            .get(entry_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("config entry {entry_id}")))?;
        self.unload_entry(entry_id);
        self.setup_entry(entry).await;
        Ok(())
    }

    /// Set up every stored entry
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn setup_all(&self) -> Result<usize, ApplicationError> {
        let entries = self.store.list().await?;
        let count = entries.len();
        for entry in entries {
            self.setup_entry(entry).await;
        }
        info!(count, "Loaded config entries");
        Ok(count)
    }

    /// Refresh one entry now
    ///
    /// # Errors
    ///
    /// - `NotFound` if the entry is not loaded
    /// - `UpdateFailed` if the refresh fails
    pub async fn refresh(&self, entry_id: &str) -> Result<StationStatus, ApplicationError> {
        let coordinator = self
            .coordinator(entry_id)
            .ok_or_else(|| ApplicationError::NotFound(format!("station {entry_id}")))?;
        coordinator.refresh().await?;
        self.station_status(entry_id)
            .ok_or_else(|| ApplicationError::NotFound(format!("station {entry_id}")))
    }

    /// Coordinator of a loaded entry
    #[must_use]
    pub fn coordinator(&self, entry_id: &str) -> Option<Arc<UpdateCoordinator>> {
        self.entries
            .read()
            .get(entry_id)
            .map(|loaded| Arc::clone(&loaded.coordinator))
    }

    /// State of every sensor, ordered by entry then descriptor
    #[must_use]
    pub fn sensors(&self) -> Vec<SensorState> {
        self.entries
            .read()
            .values()
            .flat_map(|loaded| loaded.sensors.iter().map(MetarSensor::state))
            .collect()
    }

    /// Sensors of one config entry, `None` when the entry is not loaded
    #[must_use]
    pub fn sensors_for(&self, entry_id: &str) -> Option<Vec<SensorState>> {
        self.entries
            .read()
            .get(entry_id)
            .map(|loaded| loaded.sensors.iter().map(MetarSensor::state).collect())
    }

    /// State of one sensor
    #[must_use]
    pub fn sensor(&self, unique_id: &str) -> Option<SensorState> {
        self.entries
            .read()
            .values()
            .flat_map(|loaded| loaded.sensors.iter())
            .find(|sensor| sensor.unique_id() == unique_id)
            .map(MetarSensor::state)
    }

    /// Status of one loaded entry
    #[must_use]
    pub fn station_status(&self, entry_id: &str) -> Option<StationStatus> {
        self.entries.read().get(entry_id).map(LoadedEntry::status)
    }

    /// Status of every loaded entry
    #[must_use]
    pub fn stations(&self) -> Vec<StationStatus> {
        self.entries
            .read()
            .values()
            .map(LoadedEntry::status)
            .collect()
    }

    /// True when every loaded entry has cached data
    #[must_use]
    pub fn all_available(&self) -> bool {
        self.entries
            .read()
            .values()
            .all(|loaded| loaded.coordinator.data().is_some())
    }

    /// Number of loaded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Abort every polling task
    pub fn shutdown(&self) {
        let entries = std::mem::take(&mut *self.entries.write());
        for loaded in entries.into_values() {
            loaded.task.abort();
        }
        info!("All polling tasks stopped");
    }
}

impl Drop for StationManager {
    fn drop(&mut self) {
        for loaded in self.entries.get_mut().values() {
            loaded.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::{FieldValue, ObservationField, StationConfig};
    use mockall::predicate::eq;

    use super::*;
    use crate::ports::{MockConfigEntryStore, MockObservationPort};

    fn entry(code: &str) -> ConfigEntry {
        ConfigEntry::new(StationConfig::new(StationCode::new(code).unwrap()))
    }

    fn observation(station: &str, temperature: f64) -> ParsedObservation {
        ParsedObservation::builder()
            .text(ObservationField::Station, Some(station))
            .number(ObservationField::Temperature, Some(temperature))
            .build()
    }

    fn ok_port() -> MockObservationPort {
        let mut port = MockObservationPort::new();
        port.expect_fetch_observation()
            .returning(|station| Ok(observation(station.as_str(), 22.0)));
        port
    }

    fn manager(store: MockConfigEntryStore, port: MockObservationPort) -> StationManager {
        StationManager::new(Arc::new(store), Arc::new(port), ManagerSettings::default())
    }

    #[tokio::test]
    async fn setup_entry_creates_nine_sensors() {
        let manager = manager(MockConfigEntryStore::new(), ok_port());
        manager.setup_entry(entry("KJFK")).await;

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.sensors().len(), 9);
        assert!(manager.all_available());

        let temperature = manager.sensor("metar_KJFK_temperature").unwrap();
        assert_eq!(temperature.state, FieldValue::Number(22.0));
        assert!(temperature.available);
    }

    #[tokio::test]
    async fn sensors_for_follows_entry_not_station() {
        let manager = manager(MockConfigEntryStore::new(), ok_port());
        let mut kjfk = entry("KJFK");
        kjfk.options.station = Some(StationCode::new("KLGA").unwrap());
        manager.setup_entry(kjfk).await;
        manager.setup_entry(entry("EGLL")).await;

        let sensors = manager.sensors_for("KJFK").unwrap();
        assert_eq!(sensors.len(), 9);
        assert!(sensors.iter().all(|s| s.unique_id.starts_with("metar_KLGA_")));
        assert!(manager.sensors_for("KLGA").is_none());
    }

    #[tokio::test]
    async fn failed_first_refresh_still_sets_up() {
        let mut port = MockObservationPort::new();
        port.expect_fetch_observation()
            .returning(|_| Err(ApplicationError::NotFound("station ZZZZ".into())));

        let manager = manager(MockConfigEntryStore::new(), port);
        manager.setup_entry(entry("ZZZZ")).await;

        assert_eq!(manager.len(), 1);
        assert!(!manager.all_available());
        let sensor = manager.sensor("metar_ZZZZ_pressure").unwrap();
        assert!(!sensor.available);
        assert_eq!(sensor.state, FieldValue::Unknown);

        let status = manager.station_status("ZZZZ").unwrap();
        assert!(!status.last_update_success);
        assert_eq!(status.stats.failed_updates, 1);
    }

    #[tokio::test]
    async fn options_station_drives_coordinator() {
        let mut configured = entry("KJFK");
        configured.options.station = Some(StationCode::new("KLGA").unwrap());
        configured.options.update_interval = Some(UpdateInterval::new(10).unwrap());

        let mut port = MockObservationPort::new();
        port.expect_fetch_observation()
            .withf(|station| station.as_str() == "KLGA")
            .returning(|station| Ok(observation(station.as_str(), 5.0)));

        let manager = manager(MockConfigEntryStore::new(), port);
        manager.setup_entry(configured).await;

        assert!(manager.sensor("metar_KLGA_temperature").is_some());
        let status = manager.station_status("KJFK").unwrap();
        assert_eq!(status.station.as_str(), "KLGA");
        assert_eq!(status.update_interval_minutes, 10);
    }

    #[tokio::test]
    async fn unload_entry_removes_sensors() {
        let manager = manager(MockConfigEntryStore::new(), ok_port());
        manager.setup_entry(entry("KJFK")).await;

        assert!(manager.unload_entry("KJFK"));
        assert!(!manager.unload_entry("KJFK"));
        assert!(manager.is_empty());
        assert!(manager.sensors().is_empty());
    }

    #[tokio::test]
    async fn setup_all_loads_stored_entries() {
        let mut store = MockConfigEntryStore::new();
        store
            .expect_list()
            .times(1)
            .returning(|| Ok(vec![entry("EGLL"), entry("KJFK")]));

        let manager = manager(store, ok_port());
        assert_eq!(manager.setup_all().await.unwrap(), 2);

        let ids: Vec<_> = manager
            .stations()
            .into_iter()
            .map(|s| s.entry.entry_id)
            .collect();
        assert_eq!(ids, vec!["EGLL", "KJFK"]);
        assert_eq!(manager.sensors().len(), 18);
    }

    #[tokio::test]
    async fn reload_entry_picks_up_new_options() {
        let mut updated = entry("KJFK");
        updated.options.station = Some(StationCode::new("KEWR").unwrap());

        let mut store = MockConfigEntryStore::new();
        store
            .expect_get()
            .with(eq("KJFK"))
            .returning(move |_| Ok(Some(updated.clone())));

        let manager = manager(store, ok_port());
        manager.setup_entry(entry("KJFK")).await;
        assert!(manager.sensor("metar_KJFK_raw").is_some());

        manager.reload_entry("KJFK").await.unwrap();
        assert!(manager.sensor("metar_KJFK_raw").is_none());
        assert!(manager.sensor("metar_KEWR_raw").is_some());
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn reload_missing_entry() {
        let mut store = MockConfigEntryStore::new();
        store.expect_get().returning(|_| Ok(None));

        let manager = manager(store, ok_port());
        assert!(matches!(
            manager.reload_entry("KJFK").await,
            Err(ApplicationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn manual_refresh() {
        let manager = manager(MockConfigEntryStore::new(), ok_port());
        manager.setup_entry(entry("KJFK")).await;

        let status = manager.refresh("KJFK").await.unwrap();
        assert_eq!(status.stats.successful_updates, 2);
        assert!(status.observation.is_some());

        assert!(matches!(
            manager.refresh("EGLL").await,
            Err(ApplicationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn shutdown_clears_entries() {
        let manager = manager(MockConfigEntryStore::new(), ok_port());
        manager.setup_entry(entry("KJFK")).await;
        manager.shutdown();
        assert!(manager.is_empty());
    }
}
