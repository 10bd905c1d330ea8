//! End-to-end tests for the METAR adapter against a mock bulletin server

use std::{sync::Arc, time::Duration};

use application::{
    error::ApplicationError,
    ports::ObservationPort,
    services::{ManagerSettings, StationManager},
};
use domain::{ConfigEntry, FieldValue, ObservationField, StationCode, StationConfig, UpdateInterval};
use infrastructure::{JsonEntryStore, MetarAdapter};
use integration_metar::MetarConfig;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const KJFK_BULLETIN: &str = "2024/01/20 16:51\nKJFK 201651Z 18010KT 10SM FEW050 22/14 A3001\n";

fn adapter(mock_server: &MockServer) -> MetarAdapter {
    MetarAdapter::with_config(MetarConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn kjfk() -> StationCode {
    StationCode::new("KJFK").unwrap()
}

#[tokio::test]
async fn adapter_returns_parsed_observation() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/KJFK.TXT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(KJFK_BULLETIN))
        .mount(&mock_server)
        .await;

    let obs = adapter(&mock_server).fetch_observation(&kjfk()).await.unwrap();

    assert_eq!(obs.get(ObservationField::Temperature), &FieldValue::Number(22.0));
    assert_eq!(obs.get(ObservationField::Dewpoint), &FieldValue::Number(14.0));
    assert_eq!(
        obs.get(ObservationField::Clouds).as_text(),
        Some("a few clouds at 5000 feet")
    );
}

#[tokio::test]
async fn adapter_maps_missing_station_to_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = adapter(&mock_server)
        .fetch_observation(&kjfk())
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NotFound(_)), "got {err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn adapter_maps_outage_to_retryable_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let err = adapter(&mock_server)
        .fetch_observation(&kjfk())
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::ExternalService(_)), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn adapter_maps_undecodable_report_to_invalid_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2024/01/20 16:51\n<html>oops</html>\n"))
        .mount(&mock_server)
        .await;

    let err = adapter(&mock_server)
        .fetch_observation(&kjfk())
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidResponse(_)), "got {err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn manager_loads_persisted_entries_and_polls() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/KJFK.TXT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(KJFK_BULLETIN))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let entries_path = dir.path().join("entries.json");
    {
        use application::ports::ConfigEntryStore;
        let store = JsonEntryStore::open(&entries_path).await.unwrap();
        let mut entry = ConfigEntry::new(StationConfig::new(kjfk()));
        entry.options.update_interval = Some(UpdateInterval::new(5).unwrap());
        store.save(&entry).await.unwrap();
    }

    let store = Arc::new(JsonEntryStore::open(&entries_path).await.unwrap());
    let manager = StationManager::new(
        store,
        Arc::new(adapter(&mock_server)),
        ManagerSettings {
            default_interval: UpdateInterval::default(),
            fetch_timeout: Duration::from_secs(5),
        },
    );

    assert_eq!(manager.setup_all().await.unwrap(), 1);
    assert!(manager.all_available());

    let sensor = manager.sensor("metar_KJFK_pressure").unwrap();
    assert_eq!(sensor.state, FieldValue::Number(1016.3));

    manager.shutdown();
}
