//! NOAA METAR integration
//!
//! Fetches the plaintext bulletin published for every ICAO station at
//! <https://tgftp.nws.noaa.gov/data/observations/metar/stations/> and turns
//! its coded line into a [`domain::ParsedObservation`].

mod bulletin;
pub mod client;
mod describe;
mod observation;

pub use bulletin::RawBulletin;
pub use client::{MetarClient, MetarConfig, MetarError, NoaaMetarClient};
pub use observation::{parse_bulletin, parse_observation};
