//! JSON file config entry store
//!
//! Keeps every entry in memory and rewrites the whole file on each change.
//! Writes go to a sibling temp file that is renamed over the original, so a
//! crash never leaves a truncated file behind.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use application::{error::ApplicationError, ports::ConfigEntryStore};
use async_trait::async_trait;
use domain::ConfigEntry;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Config entries persisted as a JSON array
#[derive(Debug)]
pub struct JsonEntryStore {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, ConfigEntry>>,
}

impl JsonEntryStore {
    /// Open a store backed by `path`, loading it if it exists
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ApplicationError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let list: Vec<ConfigEntry> = serde_json::from_slice(&bytes).map_err(|e| {
                    ApplicationError::Internal(format!("invalid {}: {e}", path.display()))
                })?;
                list.into_iter()
                    .map(|entry| (entry.entry_id.clone(), entry))
                    .collect()
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ApplicationError::Internal(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            },
        };

        info!(path = %path.display(), count = entries.len(), "Opened config entry store");
        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// A store that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Backing file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, entries: &BTreeMap<String, ConfigEntry>) -> Result<(), ApplicationError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let list: Vec<&ConfigEntry> = entries.values().collect();
        let json = serde_json::to_vec_pretty(&list)
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| ApplicationError::Internal(format!("cannot write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| ApplicationError::Internal(format!("cannot write {}: {e}", path.display())))?;

        debug!(path = %path.display(), count = list.len(), "Persisted config entries");
        Ok(())
    }
}

#[async_trait]
impl ConfigEntryStore for JsonEntryStore {
    async fn list(&self) -> Result<Vec<ConfigEntry>, ApplicationError> {
        Ok(self.entries.lock().await.values().cloned().collect())
    }

    async fn get(&self, entry_id: &str) -> Result<Option<ConfigEntry>, ApplicationError> {
        Ok(self.entries.lock().await.get(entry_id).cloned())
    }

    #[instrument(skip(self, entry), fields(entry_id = %entry.entry_id))]
    async fn insert_unique(&self, entry: &ConfigEntry) -> Result<bool, ApplicationError> {
        let mut entries = self.entries.lock().await;
        if entries.values().any(|existing| entry.conflicts_with(existing)) {
            return Ok(false);
        }
        entries.insert(entry.entry_id.clone(), entry.clone());

        if let Err(e) = self.persist(&entries).await {
            entries.remove(&entry.entry_id);
            return Err(e);
        }
        Ok(true)
    }

    #[instrument(skip(self, entry), fields(entry_id = %entry.entry_id))]
    async fn save(&self, entry: &ConfigEntry) -> Result<(), ApplicationError> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(entry.entry_id.clone(), entry.clone());

        if let Err(e) = self.persist(&entries).await {
            // Keep memory and disk in agreement
            match previous {
                Some(previous) => entries.insert(entry.entry_id.clone(), previous),
                None => entries.remove(&entry.entry_id),
            };
            return Err(e);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, entry_id: &str) -> Result<bool, ApplicationError> {
        let mut entries = self.entries.lock().await;
        let Some(removed) = entries.remove(entry_id) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&entries).await {
            entries.insert(entry_id.to_string(), removed);
            return Err(e);
        }
        Ok(true)
    }
}
