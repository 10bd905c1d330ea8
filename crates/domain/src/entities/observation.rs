//! Parsed METAR observation
//!
//! A flat mapping from field to value. Every field is always present; a
//! measurement missing from the report is [`FieldValue::Unknown`] rather
//! than an absent key.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Fields published for every observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationField {
    Station,
    Raw,
    LastUpdate,
    Temperature,
    Dewpoint,
    WindSpeed,
    WindDirection,
    Visibility,
    Pressure,
    Weather,
    Clouds,
}

impl ObservationField {
    /// All fields, in publication order
    pub const ALL: [Self; 11] = [
        Self::Station,
        Self::Raw,
        Self::LastUpdate,
        Self::Temperature,
        Self::Dewpoint,
        Self::WindSpeed,
        Self::WindDirection,
        Self::Visibility,
        Self::Pressure,
        Self::Weather,
        Self::Clouds,
    ];

    /// Stable key used in unique ids and attribute maps
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::Raw => "raw",
            Self::LastUpdate => "last_update",
            Self::Temperature => "temperature",
            Self::Dewpoint => "dewpoint",
            Self::WindSpeed => "wind_speed",
            Self::WindDirection => "wind_direction",
            Self::Visibility => "visibility",
            Self::Pressure => "pressure",
            Self::Weather => "weather",
            Self::Clouds => "clouds",
        }
    }
}

impl fmt::Display for ObservationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value of one observation field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Numeric measurement in the field's target unit
    Number(f64),
    /// Text such as a compass point or weather description
    Text(String),
    /// Observation time
    Timestamp(DateTime<Utc>),
    /// Not present in this report
    Unknown,
}

impl FieldValue {
    /// Marker published for unknown values
    pub const UNKNOWN_STATE: &'static str = "unknown";

    /// Whether the value was present in the report
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Numeric value, if any
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if any
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp value, if any
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(t) => f.write_str(&t.to_rfc3339()),
            Self::Unknown => f.write_str(Self::UNKNOWN_STATE),
        }
    }
}

/// Numbers and text serialize as themselves, timestamps as RFC 3339,
/// unknown values as the `"unknown"` marker
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Timestamp(t) => serializer.serialize_str(&t.to_rfc3339()),
            Self::Unknown => serializer.serialize_str(Self::UNKNOWN_STATE),
        }
    }
}

static UNKNOWN: FieldValue = FieldValue::Unknown;

/// One decoded observation, replaced wholesale on every successful poll
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedObservation {
    fields: BTreeMap<ObservationField, FieldValue>,
}

impl ParsedObservation {
    /// Start building an observation with every field unknown
    #[must_use]
    pub fn builder() -> ParsedObservationBuilder {
        ParsedObservationBuilder::new()
    }

    /// Value of a field; never missing
    #[must_use]
    pub fn get(&self, field: ObservationField) -> &FieldValue {
        self.fields.get(&field).unwrap_or(&UNKNOWN)
    }

    /// Station identifier as reported
    #[must_use]
    pub fn station(&self) -> Option<&str> {
        self.get(ObservationField::Station).as_text()
    }

    /// Raw METAR line
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.get(ObservationField::Raw).as_text()
    }

    /// Observation time
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.get(ObservationField::LastUpdate).as_timestamp()
    }

    /// Fields in publication order
    pub fn iter(&self) -> impl Iterator<Item = (ObservationField, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// Fields that were present in the report
    pub fn known_fields(&self) -> impl Iterator<Item = ObservationField> + '_ {
        self.iter()
            .filter(|(_, value)| value.is_known())
            .map(|(field, _)| field)
    }
}

/// Builder for [`ParsedObservation`]
///
/// Starts with every field set to [`FieldValue::Unknown`]; `None` inputs
/// leave the field unknown.
#[derive(Debug, Clone)]
pub struct ParsedObservationBuilder {
    fields: BTreeMap<ObservationField, FieldValue>,
}

impl ParsedObservationBuilder {
    fn new() -> Self {
        Self {
            fields: ObservationField::ALL
                .into_iter()
                .map(|field| (field, FieldValue::Unknown))
                .collect(),
        }
    }

    /// Set a numeric field
    #[must_use]
    pub fn number(mut self, field: ObservationField, value: Option<f64>) -> Self {
        if let Some(n) = value.filter(|n| n.is_finite()) {
            self.fields.insert(field, FieldValue::Number(n));
        }
        self
    }

    /// Set a text field; empty text stays unknown
    #[must_use]
    pub fn text(mut self, field: ObservationField, value: Option<impl Into<String>>) -> Self {
        if let Some(s) = value.map(Into::into).filter(|s| !s.is_empty()) {
            self.fields.insert(field, FieldValue::Text(s));
        }
        self
    }

    /// Set a timestamp field
    #[must_use]
    pub fn timestamp(mut self, field: ObservationField, value: Option<DateTime<Utc>>) -> Self {
        if let Some(t) = value {
            self.fields.insert(field, FieldValue::Timestamp(t));
        }
        self
    }

    /// Finish the observation
    #[must_use]
    pub fn build(self) -> ParsedObservation {
        ParsedObservation {
            fields: self.fields,
        }
    }
}
