//! Station bulletin text
//!
//! A bulletin is the two-line body served for a station:
//!
//! ```text
//! 2024/01/20 16:51
//! KJFK 201651Z 18010KT 10SM FEW050 22/14 A3001
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::client::MetarError;

/// Banner timestamp format, always UTC
const BANNER_FORMAT: &str = "%Y/%m/%d %H:%M";

/// A fetched bulletin with at least a banner and an observation line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBulletin {
    banner: String,
    observation: String,
}

impl RawBulletin {
    /// Split a response body into banner and observation line
    ///
    /// Blank lines are ignored. Lines after the observation are dropped.
    ///
    /// # Errors
    ///
    /// Returns `MalformedBulletin` if fewer than two non-empty lines remain.
    pub fn parse(body: &str) -> Result<Self, MetarError> {
        let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());

        match (lines.next(), lines.next()) {
            (Some(banner), Some(observation)) => Ok(Self {
                banner: banner.to_string(),
                observation: observation.to_string(),
            }),
            _ => Err(MetarError::MalformedBulletin(format!(
                "expected 2 lines, got {}",
                body.lines().filter(|l| !l.trim().is_empty()).count()
            ))),
        }
    }

    /// First line, normally the publication timestamp
    #[must_use]
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Second line, the coded METAR
    #[must_use]
    pub fn observation_line(&self) -> &str {
        &self.observation
    }

    /// Banner parsed as a UTC timestamp, if well-formed
    #[must_use]
    pub fn banner_time(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.banner, BANNER_FORMAT)
            .ok()
            .map(|dt| Utc.from_utc_datetime(&dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "2024/01/20 16:51\nKJFK 201651Z 18010KT 10SM FEW050 22/14 A3001\n";

    #[test]
    fn splits_banner_and_observation() {
        let bulletin = RawBulletin::parse(BODY).unwrap();
        assert_eq!(bulletin.banner(), "2024/01/20 16:51");
        assert_eq!(
            bulletin.observation_line(),
            "KJFK 201651Z 18010KT 10SM FEW050 22/14 A3001"
        );
    }

    #[test]
    fn banner_time_is_utc() {
        let bulletin = RawBulletin::parse(BODY).unwrap();
        assert_eq!(
            bulletin.banner_time().map(|t| t.to_rfc3339()),
            Some("2024-01-20T16:51:00+00:00".to_string())
        );
    }

    #[test]
    fn malformed_banner_has_no_time() {
        let bulletin = RawBulletin::parse("latest report\nKJFK 201651Z 22/14").unwrap();
        assert!(bulletin.banner_time().is_none());
    }

    #[test]
    fn crlf_and_blank_lines_are_tolerated() {
        let bulletin = RawBulletin::parse("\r\n2024/01/20 16:51\r\n\r\nEGLL 201650Z 9999\r\n").unwrap();
        assert_eq!(bulletin.observation_line(), "EGLL 201650Z 9999");
    }

    #[test]
    fn single_line_is_malformed() {
        let err = RawBulletin::parse("2024/01/20 16:51\n").unwrap_err();
        assert!(matches!(err, MetarError::MalformedBulletin(_)));
        assert!(err.to_string().contains("got 1"));
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(matches!(
            RawBulletin::parse(""),
            Err(MetarError::MalformedBulletin(_))
        ));
    }
}
