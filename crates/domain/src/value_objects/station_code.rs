//! ICAO station code value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A validated four-character ICAO station identifier (e.g., KJFK)
///
/// Input is trimmed and uppercased, so `" kjfk "` and `"KJFK"` are the same
/// station.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationCode {
    value: String,
}

impl StationCode {
    /// Length of an ICAO location indicator
    pub const LEN: usize = 4;

    /// Create a new station code, validating ICAO format
    ///
    /// - Exactly four characters after trimming
    /// - ASCII letters and digits only
    /// - Starts with a letter
    pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
        let value = code.into().trim().to_ascii_uppercase();

        if value.len() != Self::LEN {
            return Err(DomainError::InvalidStationCode(format!(
                "'{value}' must be exactly {} characters",
                Self::LEN
            )));
        }

        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidStationCode(format!(
                "'{value}' must contain only letters and digits"
            )));
        }

        if !value.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidStationCode(format!(
                "'{value}' must start with a letter"
            )));
        }

        Ok(Self { value })
    }

    /// Get the station code as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for StationCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for StationCode {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StationCode> for String {
    fn from(code: StationCode) -> Self {
        code.value
    }
}

impl AsRef<str> for StationCode {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
