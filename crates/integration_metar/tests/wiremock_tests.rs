//! Integration tests for the METAR client using wiremock
//!
//! These tests verify the client's behavior against a mock bulletin server,
//! ensuring proper handling of various response scenarios.

use domain::{ObservationField, StationCode};
use integration_metar::{MetarClient, MetarConfig, MetarError, NoaaMetarClient};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const KJFK_BULLETIN: &str = "2024/01/20 16:51\nKJFK 201651Z 18010KT 10SM FEW050 22/14 A3001\n";

fn kjfk() -> StationCode {
    StationCode::new("KJFK").unwrap()
}

/// Create a test client configured to use the mock server
///
/// # Panics
///
/// Panics if the client cannot be created (should not happen in tests).
fn create_test_client(mock_server: &MockServer) -> NoaaMetarClient {
    let config = MetarConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
    };
    #[allow(clippy::expect_used)]
    NoaaMetarClient::new(config).expect("Failed to create client")
}

/// Setup a mock for the KJFK bulletin with the given response
async fn setup_station_mock(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/KJFK.TXT"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_fetch_bulletin_success() {
    let mock_server = MockServer::start().await;
    setup_station_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(KJFK_BULLETIN),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_bulletin(&kjfk()).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
    let bulletin = result.unwrap();
    assert_eq!(bulletin.banner(), "2024/01/20 16:51");
    assert!(bulletin.observation_line().starts_with("KJFK 201651Z"));
}

#[tokio::test]
async fn test_fetch_observation_success() {
    let mock_server = MockServer::start().await;
    setup_station_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(KJFK_BULLETIN),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_observation(&kjfk()).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
    let obs = result.unwrap();
    assert_eq!(obs.station(), Some("KJFK"));
    assert_eq!(
        obs.get(ObservationField::WindDirection).as_text(),
        Some("S")
    );
    let speed = obs.get(ObservationField::WindSpeed).as_number().unwrap();
    assert!((speed - 18.5).abs() < 0.01);
    let pressure = obs.get(ObservationField::Pressure).as_number().unwrap();
    assert!((pressure - 1016.3).abs() < 0.01);
    assert_eq!(
        obs.last_update().map(|t| t.to_rfc3339()),
        Some("2024-01-20T16:51:00+00:00".to_string())
    );
}

#[tokio::test]
async fn test_repeated_fetch_is_deterministic() {
    let mock_server = MockServer::start().await;
    setup_station_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(KJFK_BULLETIN),
    )
    .await;

    let client = create_test_client(&mock_server);
    let first = client.fetch_observation(&kjfk()).await.unwrap();
    let second = client.fetch_observation(&kjfk()).await.unwrap();

    assert_eq!(first, second);
}

// ============================================================================
// Error handling scenarios
// ============================================================================

#[tokio::test]
async fn test_unknown_station_returns_not_found() {
    let mock_server = MockServer::start().await;
    setup_station_mock(&mock_server, ResponseTemplate::new(404)).await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_observation(&kjfk()).await;

    assert!(
        matches!(result, Err(MetarError::StationNotFound(ref s)) if s == "KJFK"),
        "Expected StationNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_returns_service_unavailable() {
    let mock_server = MockServer::start().await;
    setup_station_mock(
        &mock_server,
        ResponseTemplate::new(503).set_body_string(KJFK_BULLETIN),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_observation(&kjfk()).await;

    // A valid body on an error status must not be decoded
    assert!(
        matches!(result, Err(MetarError::ServiceUnavailable(_))),
        "Expected ServiceUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_error() {
    let mock_server = MockServer::start().await;
    setup_station_mock(&mock_server, ResponseTemplate::new(429)).await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_bulletin(&kjfk()).await;

    assert!(
        matches!(result, Err(MetarError::RateLimitExceeded)),
        "Expected RateLimitExceeded, got: {result:?}"
    );
}

#[tokio::test]
async fn test_single_line_body_is_malformed() {
    let mock_server = MockServer::start().await;
    setup_station_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("2024/01/20 16:51\n"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_observation(&kjfk()).await;

    assert!(
        matches!(result, Err(MetarError::MalformedBulletin(_))),
        "Expected MalformedBulletin, got: {result:?}"
    );
}

#[tokio::test]
async fn test_garbage_observation_line_fails_decoding() {
    let mock_server = MockServer::start().await;
    setup_station_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("2024/01/20 16:51\n<html>oops</html>\n"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_observation(&kjfk()).await;

    assert!(
        matches!(result, Err(MetarError::DecodeFailed(_))),
        "Expected DecodeFailed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;
    setup_station_mock(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_string(KJFK_BULLETIN)
            .set_delay(std::time::Duration::from_secs(3)),
    )
    .await;

    let config = MetarConfig {
        base_url: mock_server.uri(),
        timeout_secs: 1,
    };
    let client = NoaaMetarClient::new(config).unwrap();
    let result = client.fetch_bulletin(&kjfk()).await;

    assert!(
        matches!(result, Err(MetarError::Timeout(1))),
        "Expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unreachable_server() {
    let config = MetarConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
    };
    let client = NoaaMetarClient::new(config).unwrap();
    let result = client.fetch_bulletin(&kjfk()).await;

    assert!(
        matches!(
            result,
            Err(MetarError::ConnectionFailed(_) | MetarError::RequestFailed(_))
        ),
        "Expected connection error, got: {result:?}"
    );
}

// ============================================================================
// Request verification
// ============================================================================

#[tokio::test]
async fn test_request_uses_uppercase_station_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/EGLL.TXT"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("2024/01/20 16:50\nEGLL 201650Z 22015KT 9999 SCT030 15/08 Q1008\n"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let station = StationCode::new("egll").unwrap();
    let result = client.fetch_observation(&station).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
}
