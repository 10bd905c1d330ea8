//! METAR sensor entities
//!
//! One entity per descriptor per station. Entities render from the
//! coordinator cache and never perform I/O.

use std::{collections::BTreeMap, sync::Arc};

use domain::{
    ATTRIBUTION, DeviceClass, FieldValue, ObservationField, ParsedObservation, SENSOR_TYPES,
    SensorDescriptor, StateClass,
};
use serde::Serialize;
use serde_json::Value;

use super::update_coordinator::UpdateCoordinator;

/// Attribute keys
pub mod attributes {
    pub const ATTRIBUTION: &str = "attribution";
    pub const STATION: &str = "station";
    pub const LAST_UPDATE: &str = "last_update";
    pub const RAW: &str = "raw";
}

/// A single sensor bound to a coordinator
#[derive(Debug, Clone)]
pub struct MetarSensor {
    descriptor: &'static SensorDescriptor,
    coordinator: Arc<UpdateCoordinator>,
    unique_id: String,
    name: String,
}

/// Rendered sensor, as published to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    pub key: ObservationField,
    pub state: FieldValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<DeviceClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
    pub available: bool,
    pub attributes: BTreeMap<&'static str, Value>,
}

impl MetarSensor {
    /// Create the sensor for one descriptor
    #[must_use]
    pub fn new(descriptor: &'static SensorDescriptor, coordinator: Arc<UpdateCoordinator>) -> Self {
        let station = coordinator.station();
        Self {
            unique_id: descriptor.unique_id(station),
            name: descriptor.display_name(station),
            descriptor,
            coordinator,
        }
    }

    /// Create one sensor per entry of [`SENSOR_TYPES`]
    #[must_use]
    pub fn for_coordinator(coordinator: &Arc<UpdateCoordinator>) -> Vec<Self> {
        SENSOR_TYPES
            .iter()
            .map(|descriptor| Self::new(descriptor, Arc::clone(coordinator)))
            .collect()
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn descriptor(&self) -> &'static SensorDescriptor {
        self.descriptor
    }

    /// True once any observation is cached, even if later polls failed
    #[must_use]
    pub fn available(&self) -> bool {
        self.coordinator.data().is_some()
    }

    /// Primary state, `Unknown` when absent from the report or before the
    /// first successful poll
    #[must_use]
    pub fn native_value(&self) -> FieldValue {
        self.value_from(self.coordinator.data().as_deref())
    }

    /// Extra state attributes
    #[must_use]
    pub fn extra_attributes(&self) -> BTreeMap<&'static str, Value> {
        self.attributes_from(self.coordinator.data().as_deref())
    }

    /// Render the full state from one cache snapshot
    ///
    /// A poll completing mid-render cannot mix values from two reports.
    #[must_use]
    pub fn state(&self) -> SensorState {
        let snapshot = self.coordinator.data();
        self.render(snapshot.as_deref())
    }

    fn render(&self, obs: Option<&ParsedObservation>) -> SensorState {
        SensorState {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            key: self.descriptor.key,
            state: self.value_from(obs),
            unit_of_measurement: self.descriptor.unit,
            icon: self.descriptor.icon,
            device_class: self.descriptor.device_class,
            state_class: self.descriptor.state_class,
            available: obs.is_some(),
            attributes: self.attributes_from(obs),
        }
    }

    fn value_from(&self, obs: Option<&ParsedObservation>) -> FieldValue {
        obs.map_or(FieldValue::Unknown, |obs| obs.get(self.descriptor.key).clone())
    }

    fn attributes_from(&self, obs: Option<&ParsedObservation>) -> BTreeMap<&'static str, Value> {
        let mut attrs = BTreeMap::new();
        attrs.insert(attributes::ATTRIBUTION, Value::from(ATTRIBUTION));

        let Some(obs) = obs else {
            return attrs;
        };

        let station = obs
            .station()
            .unwrap_or_else(|| self.coordinator.station().as_str());
        attrs.insert(attributes::STATION, Value::from(station));
        attrs.insert(
            attributes::LAST_UPDATE,
            obs.last_update()
                .map_or(Value::Null, |t| Value::from(t.to_rfc3339())),
        );

        if let (ObservationField::Raw, Some(raw)) = (self.descriptor.key, obs.raw()) {
            attrs.insert(attributes::RAW, Value::from(raw));
        }

        attrs
    }
}
