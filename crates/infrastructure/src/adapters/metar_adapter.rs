//! METAR adapter - Implements ObservationPort using integration_metar

use application::{error::ApplicationError, ports::ObservationPort};
use async_trait::async_trait;
use domain::{ParsedObservation, StationCode};
use integration_metar::{MetarClient, MetarConfig, MetarError, NoaaMetarClient};
use tracing::{debug, instrument};

/// Adapter for the NOAA station bulletins
pub struct MetarAdapter {
    client: Box<dyn MetarClient>,
}

impl std::fmt::Debug for MetarAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetarAdapter")
            .field("client", &"MetarClient")
            .finish()
    }
}

impl MetarAdapter {
    /// Create a new adapter with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new() -> Result<Self, ApplicationError> {
        Self::with_config(MetarConfig::default())
    }

    /// Create with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn with_config(config: MetarConfig) -> Result<Self, ApplicationError> {
        let client =
            NoaaMetarClient::new(config).map_err(|e| ApplicationError::Internal(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: impl MetarClient + 'static) -> Self {
        Self {
            client: Box::new(client),
        }
    }

    /// Map integration METAR error to application error
    ///
    /// Transient failures stay retryable; anything else will fail the same
    /// way until the station publishes a new bulletin.
    fn map_error(err: MetarError) -> ApplicationError {
        match err {
            MetarError::StationNotFound(station) => {
                ApplicationError::NotFound(format!("no METAR published for station {station}"))
            },
            e if e.is_transient() => ApplicationError::ExternalService(e.to_string()),
            e => ApplicationError::InvalidResponse(e.to_string()),
        }
    }
}

#[async_trait]
impl ObservationPort for MetarAdapter {
    #[instrument(skip(self), fields(station = %station))]
    async fn fetch_observation(
        &self,
        station: &StationCode,
    ) -> Result<ParsedObservation, ApplicationError> {
        let result = self
            .client
            .fetch_observation(station)
            .await
            .map_err(Self::map_error);

        match &result {
            Ok(observation) => {
                debug!(
                    known_fields = observation.known_fields().count(),
                    "Retrieved METAR observation"
                );
            },
            Err(e) => {
                debug!(error = %e, "Failed to get METAR observation");
            },
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use integration_metar::RawBulletin;

    use super::*;

    const BULLETIN: &str = "2024/01/20 16:51\nKJFK 201651Z 18010KT 10SM FEW050 22/14 A3001";

    struct FixedClient {
        body: Option<&'static str>,
    }

    #[async_trait]
    impl MetarClient for FixedClient {
        async fn fetch_bulletin(&self, station: &StationCode) -> Result<RawBulletin, MetarError> {
            match self.body {
                Some(body) => RawBulletin::parse(body),
                None => Err(MetarError::StationNotFound(station.to_string())),
            }
        }
    }

    fn kjfk() -> StationCode {
        StationCode::new("KJFK").unwrap()
    }

    #[test]
    fn new_creates_adapter() {
        assert!(MetarAdapter::new().is_ok());
    }

    #[test]
    fn debug_impl() {
        let adapter = MetarAdapter::new().unwrap();
        assert!(format!("{adapter:?}").contains("MetarAdapter"));
    }

    #[test]
    fn map_error_not_found() {
        let app_err = MetarAdapter::map_error(MetarError::StationNotFound("ZZZZ".into()));
        assert!(matches!(app_err, ApplicationError::NotFound(ref m) if m.contains("ZZZZ")));
    }

    #[test]
    fn map_error_transient_is_retryable() {
        for err in [
            MetarError::ConnectionFailed("refused".into()),
            MetarError::Timeout(30),
            MetarError::RateLimitExceeded,
            MetarError::ServiceUnavailable("HTTP 503".into()),
        ] {
            let app_err = MetarAdapter::map_error(err);
            assert!(matches!(app_err, ApplicationError::ExternalService(_)));
            assert!(app_err.is_retryable());
        }
    }

    #[test]
    fn map_error_format_is_not_retryable() {
        for err in [
            MetarError::RequestFailed("HTTP 204".into()),
            MetarError::MalformedBulletin("expected 2 lines, got 1".into()),
            MetarError::DecodeFailed("empty report".into()),
        ] {
            let app_err = MetarAdapter::map_error(err);
            assert!(matches!(app_err, ApplicationError::InvalidResponse(_)));
            assert!(!app_err.is_retryable());
        }
    }

    #[tokio::test]
    async fn fetches_through_client() {
        let adapter = MetarAdapter::with_client(FixedClient {
            body: Some(BULLETIN),
        });
        let obs = adapter.fetch_observation(&kjfk()).await.unwrap();
        assert_eq!(obs.station(), Some("KJFK"));
    }

    #[tokio::test]
    async fn maps_client_errors() {
        let adapter = MetarAdapter::with_client(FixedClient { body: None });
        let err = adapter.fetch_observation(&kjfk()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MetarAdapter>();
    }
}
