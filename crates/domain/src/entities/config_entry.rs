//! Station config entries
//!
//! A config entry is created once per station by the setup flow. Its data
//! never changes afterwards; later edits go into `options`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{StationCode, UpdateInterval};

/// Data captured by the setup flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station to poll
    pub station: StationCode,
    /// Polling interval override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<UpdateInterval>,
}

impl StationConfig {
    /// Config for a station with the default interval
    #[must_use]
    pub const fn new(station: StationCode) -> Self {
        Self {
            station,
            update_interval: None,
        }
    }
}

/// Overrides set through the options flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<StationCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<UpdateInterval>,
}

/// A configured station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique id: the station code given at setup
    pub entry_id: String,
    /// Display title
    pub title: String,
    pub data: StationConfig,
    #[serde(default)]
    pub options: StationOptions,
    pub created_at: DateTime<Utc>,
}

impl ConfigEntry {
    /// Create an entry from setup data
    #[must_use]
    pub fn new(data: StationConfig) -> Self {
        Self {
            entry_id: data.station.to_string(),
            title: data.station.to_string(),
            data,
            options: StationOptions::default(),
            created_at: Utc::now(),
        }
    }

    /// Station in effect: the options override, else the setup station
    #[must_use]
    pub fn station(&self) -> &StationCode {
        self.options.station.as_ref().unwrap_or(&self.data.station)
    }

    /// Interval in effect: options, then setup data, then `default`
    #[must_use]
    pub fn update_interval(&self, default: UpdateInterval) -> UpdateInterval {
        self.options
            .update_interval
            .or(self.data.update_interval)
            .unwrap_or(default)
    }

    /// Whether both entries cannot coexist: same id, or same station in
    /// effect (sensor unique ids derive from it)
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.entry_id == other.entry_id || self.station() == other.station()
    }
}
