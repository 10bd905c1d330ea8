//! Sensor descriptors
//!
//! Static metadata describing how one observation field is surfaced as a
//! sensor entity.

use serde::Serialize;

use super::observation::ObservationField;
use crate::value_objects::StationCode;

/// Integration domain, used as the unique id prefix
pub const DOMAIN: &str = "metar";

/// Attribution attached to every sensor
pub const ATTRIBUTION: &str = "Data provided by NOAA";

/// Kind of physical quantity a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Temperature,
    WindSpeed,
    Pressure,
}

/// How the sensor state evolves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

/// Static description of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorDescriptor {
    /// Observation field exposed as the sensor state
    pub key: ObservationField,
    /// Display name suffix
    pub name: &'static str,
    /// Unit of measurement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    /// Material Design icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<DeviceClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
}

impl SensorDescriptor {
    /// `metar_<STATION>_<key>`
    #[must_use]
    pub fn unique_id(&self, station: &StationCode) -> String {
        format!("{DOMAIN}_{station}_{}", self.key.key())
    }

    /// `METAR <STATION> <name>`
    #[must_use]
    pub fn display_name(&self, station: &StationCode) -> String {
        format!("METAR {station} {}", self.name)
    }

    /// Look up the descriptor for a field
    #[must_use]
    pub fn for_field(field: ObservationField) -> Option<&'static Self> {
        SENSOR_TYPES.iter().find(|d| d.key == field)
    }
}

/// Every sensor created for a station
pub const SENSOR_TYPES: [SensorDescriptor; 9] = [
    SensorDescriptor {
        key: ObservationField::Temperature,
        name: "Temperature",
        unit: Some("°C"),
        icon: None,
        device_class: Some(DeviceClass::Temperature),
        state_class: Some(StateClass::Measurement),
    },
    SensorDescriptor {
        key: ObservationField::Dewpoint,
        name: "Dewpoint",
        unit: Some("°C"),
        icon: None,
        device_class: Some(DeviceClass::Temperature),
        state_class: Some(StateClass::Measurement),
    },
    SensorDescriptor {
        key: ObservationField::WindSpeed,
        name: "Wind Speed",
        unit: Some("km/h"),
        icon: None,
        device_class: Some(DeviceClass::WindSpeed),
        state_class: Some(StateClass::Measurement),
    },
    SensorDescriptor {
        key: ObservationField::WindDirection,
        name: "Wind Direction",
        unit: None,
        icon: Some("mdi:compass"),
        device_class: None,
        state_class: None,
    },
    SensorDescriptor {
        key: ObservationField::Visibility,
        name: "Visibility",
        unit: Some("km"),
        icon: Some("mdi:eye"),
        device_class: None,
        state_class: Some(StateClass::Measurement),
    },
    SensorDescriptor {
        key: ObservationField::Pressure,
        name: "Pressure",
        unit: Some("hPa"),
        icon: None,
        device_class: Some(DeviceClass::Pressure),
        state_class: Some(StateClass::Measurement),
    },
    SensorDescriptor {
        key: ObservationField::Weather,
        name: "Weather",
        unit: None,
        icon: Some("mdi:weather-partly-cloudy"),
        device_class: None,
        state_class: None,
    },
    SensorDescriptor {
        key: ObservationField::Clouds,
        name: "Clouds",
        unit: None,
        icon: Some("mdi:cloud"),
        device_class: None,
        state_class: None,
    },
    SensorDescriptor {
        key: ObservationField::Raw,
        name: "Raw METAR",
        unit: None,
        icon: Some("mdi:text"),
        device_class: None,
        state_class: None,
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn kjfk() -> StationCode {
        StationCode::new("KJFK").unwrap()
    }

    #[test]
    fn unique_id_pattern() {
        let descriptor = SensorDescriptor::for_field(ObservationField::WindSpeed).unwrap();
        assert_eq!(descriptor.unique_id(&kjfk()), "metar_KJFK_wind_speed");
    }

    #[test]
    fn display_name_pattern() {
        let descriptor = SensorDescriptor::for_field(ObservationField::Raw).unwrap();
        assert_eq!(descriptor.display_name(&kjfk()), "METAR KJFK Raw METAR");
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = SENSOR_TYPES.iter().map(|d| d.key).collect();
        assert_eq!(keys.len(), SENSOR_TYPES.len());
    }

    #[test]
    fn station_and_last_update_are_not_sensors() {
        assert!(SensorDescriptor::for_field(ObservationField::Station).is_none());
        assert!(SensorDescriptor::for_field(ObservationField::LastUpdate).is_none());
    }

    #[test]
    fn measurement_sensors_have_units() {
        for descriptor in SENSOR_TYPES
            .iter()
            .filter(|d| d.state_class == Some(StateClass::Measurement))
        {
            assert!(descriptor.unit.is_some(), "{} has no unit", descriptor.name);
        }
    }

    #[test]
    fn serializes_without_empty_fields() {
        let json = serde_json::to_value(SENSOR_TYPES[3]).unwrap();
        assert_eq!(json["key"], "wind_direction");
        assert_eq!(json["icon"], "mdi:compass");
        assert!(json.get("unit").is_none());
    }
}
