//! METAR sensors CLI
//!
//! Offline decoding, one-shot fetches and administration of a running
//! server.

#![allow(clippy::print_stdout)]

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use domain::StationCode;
use infrastructure::AppConfig;
use integration_metar::{MetarClient, MetarConfig, NoaaMetarClient, parse_observation};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// METAR sensors CLI
#[derive(Parser)]
#[command(name = "metar-cli")]
#[command(author, version, about = "METAR weather sensors CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a raw METAR line without network access
    ///
    /// Example: metar-cli decode "KJFK 201651Z 18010KT 10SM FEW050 22/14 A3001"
    Decode {
        /// Raw observation line
        raw: String,
    },

    /// Fetch and decode the latest observation of a station
    Fetch {
        /// ICAO station code
        station: String,

        /// Bulletin base URL (defaults to the configured one)
        #[arg(long, env = "METAR_METAR__BASE_URL")]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List sensors of a running server
    Sensors {
        /// Only sensors of this config entry
        #[arg(short, long)]
        entry: Option<String>,

        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },

    /// List stations of a running server
    Stations {
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },

    /// Add a station
    Add {
        /// ICAO station code
        station: String,

        /// Polling interval in minutes
        #[arg(short, long)]
        interval: Option<u32>,

        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },

    /// Remove a station
    Remove {
        /// Config entry id
        entry: String,

        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },

    /// Poll a station now
    Refresh {
        /// Config entry id
        entry: String,

        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },

    /// Check server readiness (used by container healthchecks)
    Health {
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Format endpoint URL
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Decode a raw line relative to `now`
fn decode(raw: &str, now: DateTime<Utc>) -> anyhow::Result<Value> {
    let observation = parse_observation(raw.trim(), now)?;
    Ok(serde_json::to_value(observation)?)
}

/// One line per sensor: `<name>: <state> <unit>`
fn format_sensor(sensor: &Value) -> String {
    let name = sensor["name"].as_str().unwrap_or("?");
    if sensor["available"] != true {
        return format!("{name}: unavailable");
    }

    let state = match &sensor["state"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match sensor["unit_of_measurement"].as_str() {
        Some(unit) if state != "unknown" => format!("{name}: {state} {unit}"),
        _ => format!("{name}: {state}"),
    }
}

/// Read a JSON body, turning error statuses into errors carrying the
/// server's message
async fn read_json(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    if status.is_success() {
        return Ok(body);
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"));
    anyhow::bail!("HTTP {}: {message}", status.as_u16())
}

async fn fetch(
    station: &str,
    base_url: Option<String>,
    timeout: Option<u64>,
) -> anyhow::Result<Value> {
    let station = StationCode::new(station)?;
    let mut config = match base_url {
        Some(base_url) => MetarConfig {
            base_url,
            ..MetarConfig::default()
        },
        None => AppConfig::load()?.metar.client_config(),
    };
    if let Some(timeout) = timeout {
        config.timeout_secs = timeout;
    }
    debug!(station = %station, base_url = %config.base_url, "Fetching observation");

    let client = NoaaMetarClient::new(config)?;
    let observation = client.fetch_observation(&station).await?;
    Ok(serde_json::to_value(observation)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = reqwest::Client::new();

    match cli.command {
        Commands::Decode { raw } => {
            let decoded = decode(&raw, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        },

        Commands::Fetch {
            station,
            base_url,
            timeout,
        } => {
            let observation = fetch(&station, base_url, timeout).await?;
            println!("{}", serde_json::to_string_pretty(&observation)?);
        },

        Commands::Sensors { entry, url } => {
            let mut request = client.get(endpoint_url(&url, "/v1/sensors"));
            if let Some(entry) = entry {
                request = request.query(&[("entry_id", entry)]);
            }
            let sensors = read_json(request.send().await?).await?;

            for sensor in sensors.as_array().into_iter().flatten() {
                println!("{}", format_sensor(sensor));
            }
        },

        Commands::Stations { url } => {
            let stations =
                read_json(client.get(endpoint_url(&url, "/v1/stations")).send().await?).await?;
            println!("{}", serde_json::to_string_pretty(&stations)?);
        },

        Commands::Add {
            station,
            interval,
            url,
        } => {
            let created = read_json(
                client
                    .post(endpoint_url(&url, "/v1/stations"))
                    .json(&json!({ "station": station, "update_interval": interval }))
                    .send()
                    .await?,
            )
            .await?;

            let entry_id = created["entry"]["entry_id"].as_str().unwrap_or("?");
            if created["available"] == true {
                println!("✅ Added {entry_id}");
            } else {
                println!("⚠️  Added {entry_id}, no observation yet");
            }
        },

        Commands::Remove { entry, url } => {
            let path = format!("/v1/stations/{entry}");
            read_json(client.delete(endpoint_url(&url, &path)).send().await?).await?;
            println!("🗑️  Removed {entry}");
        },

        Commands::Refresh { entry, url } => {
            let path = format!("/v1/stations/{entry}/refresh");
            let status = read_json(client.post(endpoint_url(&url, &path)).send().await?).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        },

        Commands::Health { url } => {
            match client.get(endpoint_url(&url, "/ready")).send().await {
                Ok(resp) if resp.status().is_success() => {
                    println!("✅ Healthy");
                    std::process::exit(0);
                },
                Ok(resp) => {
                    println!("❌ Unhealthy: HTTP {}", resp.status());
                    std::process::exit(1);
                },
                Err(e) => {
                    println!("❌ Unhealthy: {e}");
                    std::process::exit(1);
                },
            }
        },
    }

    Ok(())
}
