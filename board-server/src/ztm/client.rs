//! ZTM departures HTTP client.

use std::time::Duration;

use tracing::debug;

use crate::domain::{StopDepartures, StopId};

use super::convert::convert_response;
use super::error::FetchError;
use super::source::DepartureSource;
use super::types::DeparturesResponse;

/// Default base URL for the Gdańsk ZTM open-data API.
pub const DEFAULT_BASE_URL: &str = "https://ckan2.multimediagdansk.pl";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of an unparseable body to keep for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the ZTM client.
#[derive(Debug, Clone)]
pub struct ZtmConfig {
    /// Base URL for the API, without the `/departures` path
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl ZtmConfig {
    /// Create a config pointing at the given base URL.
    ///
    /// A trailing slash is dropped so paths can be appended directly.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ZtmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for the upstream departures endpoint.
#[derive(Debug, Clone)]
pub struct ZtmClient {
    http: reqwest::Client,
    base_url: String,
}

impl ZtmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ZtmConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// The departures endpoint for this client.
    pub fn departures_url(&self) -> String {
        format!("{}/departures", self.base_url)
    }

    /// Fetch the raw departures payload for a stop.
    pub async fn get_departures_raw(
        &self,
        stop: &StopId,
    ) -> Result<DeparturesResponse, FetchError> {
        let response = self
            .http
            .get(self.departures_url())
            .query(&[("stopId", stop.as_str())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(BODY_SNIPPET_CHARS).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
        })
    }
}

impl DepartureSource for ZtmClient {
    async fn fetch_departures(&self, stop: &StopId) -> Result<StopDepartures, FetchError> {
        let raw = self.get_departures_raw(stop).await?;
        let converted = convert_response(&raw);
        debug!(
            stop = %stop,
            departures = converted.departures.len(),
            "fetched departures"
        );
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use chrono::Timelike;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct StopQuery {
        #[serde(rename = "stopId")]
        stop_id: String,
    }

    /// Fake upstream: stop "1" is healthy, "500" errors, "bad" returns
    /// invalid JSON, "slow" never answers in time.
    async fn fake_departures(Query(q): Query<StopQuery>) -> axum::response::Response {
        match q.stop_id.as_str() {
            "1" => axum::Json(json!({
                "lastUpdate": "2025-08-13T12:00:05Z",
                "departures": [
                    {"routeShortName": "10", "headsign": "Oliwa",
                     "estimatedTime": "2025-08-13T12:00:00Z", "delayInSeconds": 120},
                    {"route": "N1", "destination": "Wrzeszcz"}
                ]
            }))
            .into_response(),
            "500" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            "bad" => (StatusCode::OK, "<html>not json</html>").into_response(),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                axum::Json(json!({"departures": []})).into_response()
            }
            _ => axum::Json(json!({})).into_response(),
        }
    }

    async fn spawn_upstream() -> String {
        let app = Router::new().route("/departures", get(fake_departures));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn stop(id: &str) -> StopId {
        StopId::parse(id).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = ZtmConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn config_strips_trailing_slash() {
        let config = ZtmConfig::new("http://localhost:8080/").with_timeout(Duration::from_secs(3));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(3));

        let client = ZtmClient::new(config).unwrap();
        assert_eq!(client.departures_url(), "http://localhost:8080/departures");
    }

    #[tokio::test]
    async fn fetches_and_normalizes() {
        let client = ZtmClient::new(ZtmConfig::new(spawn_upstream().await)).unwrap();

        let result = client.fetch_departures(&stop("1")).await.unwrap();

        assert_eq!(result.departures.len(), 2);
        assert_eq!(result.departures[0].line, "10");
        assert_eq!(result.departures[0].delay_seconds, 120);
        assert_eq!(result.departures[0].time_warsaw.map(|t| t.hour()), Some(14));
        assert_eq!(result.departures[1].line, "N1");
        assert_eq!(result.departures[1].direction, "Wrzeszcz");
        assert!(result.last_update.is_some());
    }

    #[tokio::test]
    async fn empty_object_means_no_departures() {
        let client = ZtmClient::new(ZtmConfig::new(spawn_upstream().await)).unwrap();

        let result = client.fetch_departures(&stop("42")).await.unwrap();

        assert!(result.departures.is_empty());
        assert!(result.last_update.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let client = ZtmClient::new(ZtmConfig::new(spawn_upstream().await)).unwrap();

        let err = client.fetch_departures(&stop("500")).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500, ref body } if body == "boom"));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let client = ZtmClient::new(ZtmConfig::new(spawn_upstream().await)).unwrap();

        let err = client.fetch_departures(&stop("bad")).await.unwrap_err();

        match err {
            FetchError::Decode { body, .. } => {
                assert_eq!(body.as_deref(), Some("<html>not json</html>"))
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let config = ZtmConfig::new(spawn_upstream().await).with_timeout(Duration::from_millis(200));
        let client = ZtmClient::new(config).unwrap();

        let err = client.fetch_departures(&stop("slow")).await.unwrap_err();

        match err {
            FetchError::Http(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_upstream_is_http_error() {
        // Bind then drop to get a port nobody is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ZtmClient::new(ZtmConfig::new(format!("http://{addr}"))).unwrap();
        let err = client.fetch_departures(&stop("1")).await.unwrap_err();

        assert!(matches!(err, FetchError::Http(_)));
    }
}
