//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod config_entry_store;
mod observation_port;

#[cfg(test)]
pub use config_entry_store::MockConfigEntryStore;
pub use config_entry_store::ConfigEntryStore;
#[cfg(test)]
pub use observation_port::MockObservationPort;
pub use observation_port::ObservationPort;
