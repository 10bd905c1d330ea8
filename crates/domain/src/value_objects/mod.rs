//! Value Objects - Immutable, identity-less domain primitives

mod station_code;
mod update_interval;

pub use station_code::StationCode;
pub use update_interval::UpdateInterval;
