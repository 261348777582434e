//! HTTP route handlers.
//!
//! Handlers only read the snapshot store; nothing here talks to the
//! upstream.

use std::path::Path;

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::services::ServeDir;
use tracing::warn;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/departures", get(get_departures))
        .route("/departures/:side", get(get_side))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// HTML board for both sides.
async fn index_page(State(state): State<AppState>) -> IndexTemplate {
    let [a, b] = state.board().await;

    IndexTemplate {
        sides: vec![
            SideView::new("A", state.stops.side_a.as_str(), a.as_deref()),
            SideView::new("B", state.stops.side_b.as_str(), b.as_deref()),
        ],
        refresh_secs: state.page_refresh_secs,
    }
}

/// Both sides as JSON.
///
/// 503 until both stops are loaded; 502 (with the stale data) when either
/// stop's latest fetch failed.
async fn get_departures(State(state): State<AppState>) -> Result<Response, AppError> {
    let board = state.board().await;
    let status = BoardStatus::of(&board);

    let [Some(a), Some(b)] = board else {
        return Err(AppError::NotLoaded);
    };

    let body = BoardResponse {
        message: (status == BoardStatus::Stale).then(|| "fetch error".to_string()),
        side_a: StopView::from_snapshot(&a),
        side_b: StopView::from_snapshot(&b),
    };

    Ok((status.status_code(), Json(body)).into_response())
}

/// One side as JSON, selected by `a` or `b`.
async fn get_side(
    State(state): State<AppState>,
    UrlPath(side): UrlPath<String>,
) -> Result<Response, AppError> {
    let [a, b] = state.board().await;

    let snapshot = match side.to_ascii_lowercase().as_str() {
        "a" => a,
        "b" => b,
        _ => return Err(AppError::UnknownSide(side)),
    };

    let snapshot = snapshot.ok_or(AppError::NotLoaded)?;
    let status = BoardStatus::of(&[Some(snapshot.clone())]);

    Ok((status.status_code(), Json(StopView::from_snapshot(&snapshot))).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// No successful fetch yet for a requested stop
    NotLoaded,
    /// `/departures/{side}` with something other than a or b
    UnknownSide(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotLoaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "data isn't loaded".to_string(),
            ),
            AppError::UnknownSide(side) => {
                (StatusCode::NOT_FOUND, format!("unknown side: {side}"))
            }
        };

        warn!(%status, %message, "request rejected");

        (status, Json(MessageResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    use crate::config::TrackedStops;
    use crate::domain::{StopDepartures, StopId};
    use crate::snapshot::SnapshotStore;
    use crate::ztm::{DeparturesResponse, FetchError, convert_response};

    fn stop(id: &str) -> StopId {
        StopId::parse(id).unwrap()
    }

    fn departures(line: &str) -> StopDepartures {
        let raw: DeparturesResponse = serde_json::from_value(json!({
            "lastUpdate": "2025-08-13T12:00:00Z",
            "departures": [{
                "routeShortName": line,
                "headsign": "Oliwa",
                "estimatedTime": "2025-08-13T12:10:00Z",
                "delayInSeconds": "120"
            }]
        }))
        .unwrap();
        convert_response(&raw)
    }

    fn failure() -> Result<StopDepartures, FetchError> {
        Err(FetchError::Status {
            status: 500,
            body: "boom".into(),
        })
    }

    async fn spawn_app(store: SnapshotStore) -> String {
        let stops = TrackedStops {
            side_a: stop("1"),
            side_b: stop("2"),
        };
        let app = create_router(AppState::new(store, stops), "static-does-not-exist");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn get_json(url: &str) -> (StatusCode, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let base = spawn_app(SnapshotStore::new()).await;
        let body = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn departures_not_loaded_is_503() {
        let store = SnapshotStore::new();
        store.update(stop("1"), Ok(departures("10"))).await;
        let base = spawn_app(store).await;

        let (status, body) = get_json(&format!("{base}/departures")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"message": "data isn't loaded"}));
    }

    #[tokio::test]
    async fn departures_healthy_is_200() {
        let store = SnapshotStore::new();
        store.update(stop("1"), Ok(departures("10"))).await;
        store.update(stop("2"), Ok(departures("12"))).await;
        let base = spawn_app(store).await;

        let (status, body) = get_json(&format!("{base}/departures")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("message").is_none());
        assert_eq!(body["side_a"]["error"], false);
        assert_eq!(body["side_a"]["data"][0]["line"], "10");
        assert_eq!(body["side_a"]["data"][0]["delay_seconds"], 120);
        assert_eq!(
            body["side_a"]["data"][0]["time_warsaw"],
            "2025-08-13T14:10:00+02:00"
        );
        assert_eq!(body["side_b"]["data"][0]["line"], "12");
    }

    #[tokio::test]
    async fn departures_stale_is_502_with_data() {
        let store = SnapshotStore::new();
        store.update(stop("1"), Ok(departures("10"))).await;
        store.update(stop("2"), Ok(departures("12"))).await;
        store.update(stop("2"), failure()).await;
        let base = spawn_app(store).await;

        let (status, body) = get_json(&format!("{base}/departures")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "fetch error");
        assert_eq!(body["side_b"]["error"], true);
        assert_eq!(body["side_b"]["data"][0]["line"], "12");
        assert_eq!(body["side_a"]["error"], false);
    }

    #[tokio::test]
    async fn single_side_endpoint() {
        let store = SnapshotStore::new();
        store.update(stop("1"), Ok(departures("10"))).await;
        let base = spawn_app(store).await;

        let (status, body) = get_json(&format!("{base}/departures/A")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stopId"], "1");

        let (status, _) = get_json(&format!("{base}/departures/b")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = get_json(&format!("{base}/departures/c")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "unknown side: c");
    }

    #[tokio::test]
    async fn index_renders_html() {
        let store = SnapshotStore::new();
        store.update(stop("1"), Ok(departures("10"))).await;
        let base = spawn_app(store).await;

        let response = reqwest::get(format!("{base}/")).await.unwrap();
        assert!(response.status().is_success());
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let html = response.text().await.unwrap();
        assert!(html.contains("Side A"));
        assert!(html.contains("Oliwa"));
        assert!(html.contains("not loaded yet"));
    }
}
