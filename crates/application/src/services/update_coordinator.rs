//! Update coordinator
//!
//! Polls one station on a fixed interval and caches the last successful
//! observation. Sensors read the cache; they never fetch on their own.
//!
//! The cache is swapped atomically, so readers see either the previous or
//! the new observation in full. A failed poll leaves the cache untouched and
//! only flips `last_update_success`.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use domain::{ParsedObservation, StationCode, UpdateInterval};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::{error::ApplicationError, ports::ObservationPort};

/// Slack added to the fetch timeout when bounding a whole update attempt
pub const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Coordinator timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Time between polls
    pub update_interval: Duration,
    /// Upper bound for one fetch+parse attempt
    pub request_timeout: Duration,
}

impl CoordinatorConfig {
    /// Build from a validated interval and the HTTP client timeout
    #[must_use]
    pub fn new(interval: UpdateInterval, fetch_timeout: Duration) -> Self {
        Self {
            update_interval: interval.as_duration(),
            request_timeout: fetch_timeout + REQUEST_TIMEOUT_SLACK,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new(UpdateInterval::default(), Duration::from_secs(30))
    }
}

/// Counters describing the polling history of one coordinator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    pub successful_updates: u64,
    pub failed_updates: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Whether the last failure may clear on a later poll
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error_retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
}

/// Polls one station and memoizes the latest observation
pub struct UpdateCoordinator {
    station: StationCode,
    port: Arc<dyn ObservationPort>,
    config: CoordinatorConfig,
    data: ArcSwapOption<ParsedObservation>,
    last_update_success: AtomicBool,
    stats: RwLock<CoordinatorStats>,
    notify: watch::Sender<u64>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for UpdateCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateCoordinator")
            .field("station", &self.station)
            .field("port", &"<ObservationPort>")
            .field("config", &self.config)
            .field("has_data", &self.data.load().is_some())
            .field("last_update_success", &self.last_update_success())
            .finish_non_exhaustive()
    }
}

impl UpdateCoordinator {
    /// Create a coordinator with an empty cache
    #[must_use]
    pub fn new(
        station: StationCode,
        port: Arc<dyn ObservationPort>,
        config: CoordinatorConfig,
    ) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            station,
            port,
            config,
            data: ArcSwapOption::empty(),
            last_update_success: AtomicBool::new(false),
            stats: RwLock::new(CoordinatorStats::default()),
            notify,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Station being polled
    #[must_use]
    pub const fn station(&self) -> &StationCode {
        &self.station
    }

    /// Timing in use
    #[must_use]
    pub const fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Latest successful observation, if any poll has succeeded
    #[must_use]
    pub fn data(&self) -> Option<Arc<ParsedObservation>> {
        self.data.load_full()
    }

    /// Whether the most recent attempt succeeded
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::Acquire)
    }

    /// Snapshot of the polling counters
    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        self.stats.read().clone()
    }

    /// Receive a new version number after every update attempt
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Fetch and decode now, replacing the cache on success
    ///
    /// Concurrent calls are serialized. Subscribers are notified whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// Returns `UpdateFailed` if the fetch fails, times out or the report
    /// cannot be decoded. The cached observation is kept.
    #[instrument(skip(self), fields(station = %self.station))]
    pub async fn refresh(&self) -> Result<Arc<ParsedObservation>, ApplicationError> {
        let _guard = self.refresh_lock.lock().await;
        let attempted_at = Utc::now();

        let fetched = tokio::time::timeout(
            self.config.request_timeout,
            self.port.fetch_observation(&self.station),
        )
        .await;

        let outcome = match fetched {
            Ok(Ok(observation)) => {
                let observation = Arc::new(observation);
                self.data.store(Some(Arc::clone(&observation)));
                self.record_success(attempted_at);
                debug!(
                    last_update = ?observation.last_update(),
                    "Observation updated"
                );
                Ok(observation)
            },
            Ok(Err(e)) => {
                Err(self.record_failure(attempted_at, &e.to_string(), e.is_retryable()))
            },
            Err(_) => Err(self.record_failure(
                attempted_at,
                &format!(
                    "timed out after {}s",
                    self.config.request_timeout.as_secs()
                ),
                true,
            )),
        };

        self.notify.send_modify(|version| *version = version.wrapping_add(1));
        outcome
    }

    /// Initial refresh performed while setting up an entry
    ///
    /// # Errors
    ///
    /// Same as [`refresh`](Self::refresh); callers log and continue.
    pub async fn first_refresh(&self) -> Result<(), ApplicationError> {
        info!(station = %self.station, "Performing first refresh");
        self.refresh().await.map(|_| ())
    }

    /// Spawn the polling loop
    ///
    /// The first tick is skipped since setup already performed the first
    /// refresh. Abort the returned handle to stop polling.
    pub fn spawn_polling(self: &Arc<Self>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        let interval = self.config.update_interval;

        info!(
            station = %self.station,
            interval_secs = interval.as_secs(),
            "Starting METAR polling task"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                // Failures are recorded and logged by refresh; the next tick retries
                let _ = coordinator.refresh().await;
            }
        })
    }

    fn record_success(&self, at: DateTime<Utc>) {
        self.last_update_success.store(true, Ordering::Release);
        let mut stats = self.stats.write();
        stats.successful_updates += 1;
        stats.last_attempt = Some(at);
        stats.last_success = Some(at);
        stats.last_error = None;
        stats.last_error_retryable = None;
    }

    fn record_failure(
        &self,
        at: DateTime<Utc>,
        reason: &str,
        retryable: bool,
    ) -> ApplicationError {
        self.last_update_success.store(false, Ordering::Release);
        {
            let mut stats = self.stats.write();
            stats.failed_updates += 1;
            stats.last_attempt = Some(at);
            stats.last_error = Some(reason.to_string());
            stats.last_error_retryable = Some(retryable);
        }
        let has_cached_data = self.data.load().is_some();
        if retryable {
            warn!(station = %self.station, error = %reason, has_cached_data, "METAR update failed");
        } else {
            error!(
                station = %self.station,
                error = %reason,
                has_cached_data,
                "METAR update failed until the station publishes a new report"
            );
        }
        ApplicationError::UpdateFailed(format!("{}: {reason}", self.station))
    }
}
