//! Polling interval value object
//!
//! Represents a validated coordinator polling interval in whole minutes.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::UpdateInterval;
//!
//! let interval = UpdateInterval::new(10).expect("valid interval");
//! assert_eq!(interval.as_duration().as_secs(), 600);
//!
//! // Bulletins are published at most a few times an hour
//! assert!(UpdateInterval::new(1).is_err());
//! ```

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Polling interval in minutes (5-120)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UpdateInterval(u32);

impl UpdateInterval {
    /// Shortest allowed interval
    pub const MIN_MINUTES: u32 = 5;
    /// Longest allowed interval
    pub const MAX_MINUTES: u32 = 120;
    /// Interval used when none is configured
    pub const DEFAULT_MINUTES: u32 = 30;

    /// Create a new validated interval
    ///
    /// # Errors
    ///
    /// Returns `InvalidUpdateInterval` if the value is outside 5-120 minutes.
    pub fn new(minutes: u32) -> Result<Self, DomainError> {
        if !(Self::MIN_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            return Err(DomainError::InvalidUpdateInterval(format!(
                "{minutes} minutes is out of range (must be {}-{})",
                Self::MIN_MINUTES,
                Self::MAX_MINUTES
            )));
        }
        Ok(Self(minutes))
    }

    /// Create an interval, clamping to the valid range
    #[must_use]
    pub const fn clamped(minutes: u32) -> Self {
        if minutes < Self::MIN_MINUTES {
            Self(Self::MIN_MINUTES)
        } else if minutes > Self::MAX_MINUTES {
            Self(Self::MAX_MINUTES)
        } else {
            Self(minutes)
        }
    }

    /// Interval in minutes
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Interval as a `Duration`
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }
}

impl Default for UpdateInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES)
    }
}

impl fmt::Display for UpdateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

impl TryFrom<u32> for UpdateInterval {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Custom deserialization that validates the range
impl<'de> Deserialize<'de> for UpdateInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
