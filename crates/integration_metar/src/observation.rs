//! METAR line to observation conversion
//!
//! Grammar lives in the `metar` crate; this module only picks target units,
//! rounds and flattens the decoded groups into a [`ParsedObservation`].

use chrono::{DateTime, Datelike, TimeZone, Utc};
use domain::{ObservationField, ParsedObservation};
use metar::{Metar, Pressure, Time, Visibility, WindDirection, WindSpeed};
use tracing::debug;

use crate::{
    bulletin::RawBulletin,
    client::MetarError,
    describe::{self, Reported},
};

/// Separator between multiple weather or cloud descriptions
const LIST_SEPARATOR: &str = "; ";

/// Visibility reported for `CAVOK` and `9999`
const UNLIMITED_VISIBILITY_KM: f64 = 10.0;
const UNLIMITED_VISIBILITY_M: f64 = 9999.0;

const KMH_PER_KNOT: f64 = 1.852;
const KMH_PER_MPS: f64 = 3.6;
const KM_PER_STATUTE_MILE: f64 = 1.609_344;
const HPA_PER_INHG: f64 = 33.863_9;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Decode the observation line of a bulletin
///
/// The banner timestamp supplies year and month when present; otherwise
/// `now` does.
///
/// # Errors
///
/// Returns `DecodeFailed` if the observation line cannot be decoded.
pub fn parse_bulletin(
    bulletin: &RawBulletin,
    now: DateTime<Utc>,
) -> Result<ParsedObservation, MetarError> {
    let reference = bulletin.banner_time().unwrap_or(now);
    parse_observation(bulletin.observation_line(), reference)
}

/// Decode one coded METAR line
///
/// # Errors
///
/// Returns `DecodeFailed` if the line is blank or the decoder rejects it.
pub fn parse_observation(
    raw: &str,
    reference: DateTime<Utc>,
) -> Result<ParsedObservation, MetarError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MetarError::DecodeFailed("empty report".to_string()));
    }
    let metar = Metar::parse(raw).map_err(|e| MetarError::DecodeFailed(e.to_string()))?;
    debug!(station = %metar.station, remarks = ?metar.remarks, "Decoded METAR");

    let speed = metar.wind.speed.known().map(wind_speed_kmh);
    let direction = match (metar.wind.dir.known(), speed) {
        (Some(WindDirection::Heading(degrees)), Some(kmh)) if kmh > 0.0 => {
            compass(u32::from(*degrees))
        },
        _ => None,
    };
    let weather: Vec<String> = metar.weather.iter().map(describe::weather).collect();
    let clouds = describe::sky(
        &metar.clouds,
        &metar.cloud_layers,
        metar.vert_visibility.known(),
    );

    Ok(ParsedObservation::builder()
        .text(ObservationField::Station, Some(metar.station.as_str()))
        .text(ObservationField::Raw, Some(raw))
        .timestamp(
            ObservationField::LastUpdate,
            observation_time(&metar.time, reference),
        )
        .number(
            ObservationField::Temperature,
            metar.temperature.known().map(|t| f64::from(*t)),
        )
        .number(
            ObservationField::Dewpoint,
            metar.dewpoint.known().map(|t| f64::from(*t)),
        )
        .number(ObservationField::WindSpeed, speed)
        .text(ObservationField::WindDirection, direction)
        .number(
            ObservationField::Visibility,
            metar.visibility.known().map(visibility_km),
        )
        .number(
            ObservationField::Pressure,
            metar.pressure.known().map(pressure_hpa),
        )
        .text(ObservationField::Weather, Some(weather.join(LIST_SEPARATOR)))
        .text(ObservationField::Clouds, Some(clouds.join(LIST_SEPARATOR)))
        .build())
}

fn wind_speed_kmh(speed: &WindSpeed) -> f64 {
    let kmh = match *speed {
        WindSpeed::Calm => 0.0,
        WindSpeed::Knot(knots) => f64::from(knots) * KMH_PER_KNOT,
        WindSpeed::MetresPerSecond(mps) => f64::from(mps) * KMH_PER_MPS,
        WindSpeed::KilometresPerHour(kmh) => f64::from(kmh),
    };
    round1(kmh)
}

/// Sixteen-point compass name of a heading
fn compass(degrees: u32) -> Option<&'static str> {
    let index = ((degrees % 360) * 100 + 1125) / 2250 % 16;
    usize::try_from(index)
        .ok()
        .and_then(|i| COMPASS_POINTS.get(i).copied())
}

fn visibility_km(visibility: &Visibility) -> f64 {
    match *visibility {
        Visibility::CAVOK => UNLIMITED_VISIBILITY_KM,
        Visibility::Metres(metres) if f64::from(metres) >= UNLIMITED_VISIBILITY_M => {
            UNLIMITED_VISIBILITY_KM
        },
        Visibility::Metres(metres) => round1(f64::from(metres) / 1000.0),
        Visibility::StatuteMiles(miles) => round1(f64::from(miles) * KM_PER_STATUTE_MILE),
    }
}

fn pressure_hpa(pressure: &Pressure) -> f64 {
    match *pressure {
        Pressure::Hectopascals(hpa) => f64::from(hpa),
        Pressure::InchesOfMercury(inhg) => round1(f64::from(inhg) * HPA_PER_INHG),
    }
}

/// Resolve the day/hour/minute group against a reference date
///
/// A day later than the reference day belongs to the previous month.
fn observation_time(time: &Time, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    resolve_day(
        u32::from(time.date),
        u32::from(time.hour),
        u32::from(time.minute),
        reference,
    )
}

fn resolve_day(
    day: u32,
    hour: u32,
    minute: u32,
    reference: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let (mut year, mut month) = (reference.year(), reference.month());
    if day > reference.day() {
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
