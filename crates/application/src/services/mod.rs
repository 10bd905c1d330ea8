//! Application services - Use case implementations

mod config_flow;
mod sensor;
mod station_manager;
mod update_coordinator;

pub use config_flow::{ConfigFlow, OptionsInput, UserInput};
pub use sensor::{MetarSensor, SensorState, attributes};
pub use station_manager::{ManagerSettings, StationManager, StationStatus};
pub use update_coordinator::{
    CoordinatorConfig, CoordinatorStats, REQUEST_TIMEOUT_SLACK, UpdateCoordinator,
};
