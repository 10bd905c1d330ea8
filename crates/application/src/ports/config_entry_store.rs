//! Config entry storage port
//!
//! Defines the interface for persisting station config entries across
//! restarts.

use async_trait::async_trait;
use domain::ConfigEntry;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for config entry persistence
///
/// Entries are keyed by `entry_id`, the station code given at setup.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigEntryStore: Send + Sync {
    /// List all entries, ordered by `entry_id`
    async fn list(&self) -> Result<Vec<ConfigEntry>, ApplicationError>;

    /// Get an entry by id
    async fn get(&self, entry_id: &str) -> Result<Option<ConfigEntry>, ApplicationError>;

    /// Insert `entry` unless an existing entry conflicts with it
    ///
    /// Conflicts are decided by [`ConfigEntry::conflicts_with`]; the check
    /// and the insert happen under one lock.
    ///
    /// # Returns
    /// true if the entry was inserted, false on conflict
    async fn insert_unique(&self, entry: &ConfigEntry) -> Result<bool, ApplicationError>;

    /// Insert or replace an entry
    async fn save(&self, entry: &ConfigEntry) -> Result<(), ApplicationError>;

    /// Delete an entry
    ///
    /// # Returns
    /// true if the entry was deleted, false if it didn't exist
    async fn delete(&self, entry_id: &str) -> Result<bool, ApplicationError>;
}
