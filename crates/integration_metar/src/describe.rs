//! Plain-language rendering of present weather and sky condition

use metar::{
    CloudLayer, CloudType, Clouds, Data, VertVisibility, Weather, WeatherCondition,
    WeatherIntensity,
};

/// Cloud heights are coded in hundreds of feet
const FEET_PER_HEIGHT_UNIT: u32 = 100;

/// Values the decoder reports as possibly absent
pub trait Reported<T> {
    fn known(&self) -> Option<&T>;
}

impl<T> Reported<T> for Data<T> {
    fn known(&self) -> Option<&T> {
        match self {
            Data::Known(value) => Some(value),
            Data::Unknown => None,
        }
    }
}

impl<T> Reported<T> for Option<T> {
    fn known(&self) -> Option<&T> {
        self.as_ref()
    }
}

/// `SnowGrains` → "snow grains"
fn words<T: std::fmt::Debug>(value: &T) -> String {
    let name = format!("{value:?}");
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push(' ');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// e.g. `-SHRA` → "light rain showers", `+TSRA` → "heavy thunderstorm with rain"
pub fn weather(group: &Weather) -> String {
    let mut showers = false;
    let mut thunderstorm = false;
    let mut parts = Vec::with_capacity(group.conditions.len());
    for condition in &group.conditions {
        match condition {
            WeatherCondition::Showers => showers = true,
            WeatherCondition::Thunderstorm => thunderstorm = true,
            other => parts.push(words(other)),
        }
    }
    let phenomena = parts.join(" ");

    let body = match (thunderstorm, showers, phenomena.is_empty()) {
        (true, _, false) => format!("thunderstorm with {phenomena}"),
        (true, _, true) => "thunderstorm".to_string(),
        (false, true, false) => format!("{phenomena} showers"),
        (false, true, true) => "showers".to_string(),
        (false, false, _) => phenomena,
    };

    match group.intensity {
        WeatherIntensity::Light => format!("light {body}"),
        WeatherIntensity::Heavy => format!("heavy {body}"),
        WeatherIntensity::InVicinity => format!("{body} in the vicinity"),
        _ => body,
    }
}

/// e.g. `FEW050` → "a few clouds at 5000 feet"
pub fn cloud_layer(layer: &CloudLayer) -> String {
    let (cover, cloud_type, height) = match layer {
        CloudLayer::Few(kind, height) => ("a few clouds", kind, height.known().copied()),
        CloudLayer::Scattered(kind, height) => ("scattered clouds", kind, height.known().copied()),
        CloudLayer::Broken(kind, height) => ("broken clouds", kind, height.known().copied()),
        CloudLayer::Overcast(kind, height) => ("overcast", kind, height.known().copied()),
        CloudLayer::Unknown(kind, height) => ("clouds", kind, height.known().copied()),
    };

    let mut text = match height {
        Some(height) => format!("{cover} at {} feet", u32::from(height) * FEET_PER_HEIGHT_UNIT),
        None => cover.to_string(),
    };
    match cloud_type {
        CloudType::Cumulonimbus => text.push_str(" (cumulonimbus)"),
        CloudType::ToweringCumulus => text.push_str(" (towering cumulus)"),
        _ => {},
    }
    text
}

/// Every sky condition phrase of a report, in report order
pub fn sky(
    clouds: &Data<Clouds>,
    layers: &[CloudLayer],
    vertical: Option<&VertVisibility>,
) -> Vec<String> {
    let mut out = match clouds.known() {
        Some(Clouds::NoCloudDetected) => vec!["no clouds detected".to_string()],
        Some(Clouds::NoSignificantCloud) => vec!["no significant clouds".to_string()],
        _ => layers.iter().map(cloud_layer).collect(),
    };
    match vertical {
        Some(VertVisibility::Distance(height)) => out.push(format!(
            "indefinite ceiling, vertical visibility {} feet",
            u32::from(*height) * FEET_PER_HEIGHT_UNIT
        )),
        Some(_) => out.push("indefinite ceiling".to_string()),
        None => {},
    }
    out
}

#[cfg(test)]
mod tests {
    use metar::Metar;

    use super::*;

    fn decode(groups: &str) -> Metar {
        Metar::parse(&format!("KJFK 201651Z 18010KT 10SM {groups} 22/14 A3001"))
            .unwrap_or_else(|e| panic!("{groups}: {e}"))
    }

    fn weather_of(groups: &str) -> Vec<String> {
        decode(groups).weather.iter().map(weather).collect()
    }

    fn sky_of(groups: &str) -> Vec<String> {
        let metar = decode(groups);
        sky(&metar.clouds, &metar.cloud_layers, metar.vert_visibility.known())
    }

    #[test]
    fn splits_debug_names_into_words() {
        #[derive(Debug)]
        struct SnowGrains;
        assert_eq!(words(&SnowGrains), "snow grains");
    }

    #[test]
    fn describes_present_weather() {
        assert_eq!(weather_of("-SHRA FEW050"), vec!["light rain showers"]);
        assert_eq!(weather_of("+TSRA FEW050"), vec!["heavy thunderstorm with rain"]);
        assert_eq!(weather_of("BR FEW050"), vec!["mist"]);
    }

    #[test]
    fn describes_sky_conditions() {
        assert_eq!(sky_of("FEW050"), vec!["a few clouds at 5000 feet"]);
        assert_eq!(
            sky_of("SCT025 BKN040 OVC100"),
            vec![
                "scattered clouds at 2500 feet",
                "broken clouds at 4000 feet",
                "overcast at 10000 feet"
            ]
        );
        assert_eq!(sky_of("BKN025CB"), vec!["broken clouds at 2500 feet (cumulonimbus)"]);
        assert_eq!(sky_of("NSC"), vec!["no significant clouds"]);
    }
}
