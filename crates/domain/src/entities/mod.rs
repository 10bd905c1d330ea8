//! Domain entities - Objects with identity and lifecycle

mod config_entry;
mod observation;
mod sensor;

pub use config_entry::{ConfigEntry, StationConfig, StationOptions};
pub use observation::{FieldValue, ObservationField, ParsedObservation, ParsedObservationBuilder};
pub use sensor::{ATTRIBUTION, DOMAIN, DeviceClass, SENSOR_TYPES, SensorDescriptor, StateClass};
