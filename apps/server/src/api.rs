//! HTTP API: manual polling and read-only status.

use crate::state::SharedState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cryptowatch_alerts::Assessment;
use cryptowatch_core::{AssetState, PriceSnapshot};
use cryptowatch_feeds::FeedError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No coins provided")]
    NoCoins,
    #[error("{0}")]
    Feed(#[from] FeedError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NoCoins => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::Feed(ref e) => {
                error!(error = %e, "Error during polling");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string(), "details": format!("{:?}", e) })),
                )
                    .into_response()
            }
        }
    }
}

/// `POST /api/poll` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollRequest {
    #[serde(default)]
    pub coins: Option<Vec<String>>,
}

/// `POST /api/poll` response.
#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub success: bool,
    pub coins: Vec<PriceSnapshot>,
    pub assessments: Vec<Assessment>,
    pub notification: Option<String>,
    pub message: String,
}

/// `GET /api/coin-data` response.
#[derive(Debug, Clone, Serialize)]
pub struct CoinDataResponse {
    pub coins: Vec<AssetState>,
}

/// Create the API router.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/poll", post(poll_handler))
        .route("/api/coin-data", get(coin_data_handler))
        .route("/api/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> &'static str {
    "OK"
}

/// Fetch the requested coins and run them through the alert engine.
pub async fn poll_handler(
    State(state): State<SharedState>,
    Json(request): Json<PollRequest>,
) -> Result<Json<PollResponse>, ApiError> {
    let coins: Vec<String> = request
        .coins
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if coins.is_empty() {
        return Err(ApiError::NoCoins);
    }

    info!("Polling for coins: {}", coins.join(", "));
    let outcome = state.poll(&coins).await?;

    Ok(Json(PollResponse {
        success: true,
        coins: outcome.snapshots,
        assessments: outcome.assessments,
        notification: outcome.notification,
        message: "Poll completed successfully".to_string(),
    }))
}

/// Current contents of the state store.
pub async fn coin_data_handler(State(state): State<SharedState>) -> Json<CoinDataResponse> {
    Json(CoinDataResponse {
        coins: state.coin_states().await,
    })
}

/// Poll statistics.
pub async fn stats_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.stats_summary())
}

/// Bind the API and serve it in the background.
pub async fn start_server(
    state: SharedState,
    port: u16,
) -> Result<tokio::task::JoinHandle<()>, std::io::Error> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on http://{}", addr);

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::{create_state, testing::StubFeed};
    use cryptowatch_alerts::Outcome;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn request(coins: &[&str]) -> Json<PollRequest> {
        Json(PollRequest {
            coins: Some(coins.iter().map(|s| s.to_string()).collect()),
        })
    }

    fn stub_state() -> SharedState {
        create_state(
            AppConfig::default(),
            Arc::new(StubFeed::with(vec![
                PriceSnapshot::new("bitcoin", 8.0, 50000.0),
                PriceSnapshot::new("ethereum", -8.0, 3000.0),
                PriceSnapshot::new("ripple", 2.0, 0.5),
            ])),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_poll_rejects_empty_list() {
        let state = stub_state();

        let missing = poll_handler(State(state.clone()), Json(PollRequest::default())).await;
        assert!(matches!(missing, Err(ApiError::NoCoins)));

        let empty = poll_handler(State(state.clone()), request(&[])).await;
        assert!(matches!(empty, Err(ApiError::NoCoins)));

        let blank = poll_handler(State(state), request(&["  "])).await;
        assert!(matches!(blank, Err(ApiError::NoCoins)));
    }

    #[tokio::test]
    async fn test_poll_returns_snapshots_and_notification() {
        let state = stub_state();

        let Json(response) =
            poll_handler(State(state.clone()), request(&["bitcoin", "ethereum", "ripple"]))
                .await
                .unwrap();

        assert!(response.success);
        assert_eq!(response.coins.len(), 3);
        assert_eq!(response.assessments.len(), 3);
        assert_eq!(response.assessments[2].outcome, Outcome::BelowThreshold);
        assert_eq!(response.message, "Poll completed successfully");

        let notification = response.notification.expect("notification");
        assert!(notification.contains("•up bitcoin: +8% | $50000"));
        assert!(notification.contains("•down ethereum: -8% | $3000"));
        assert!(!notification.contains("ripple"));

        let Json(data) = coin_data_handler(State(state)).await;
        assert_eq!(data.coins.len(), 2);
    }

    #[tokio::test]
    async fn test_poll_feed_failure_is_server_error() {
        let state = create_state(AppConfig::default(), Arc::new(StubFeed::failing())).unwrap();

        let err = poll_handler(State(state), request(&["bitcoin"])).await.unwrap_err();
        assert!(matches!(err, ApiError::Feed(FeedError::RateLimitExceeded)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_no_coins_is_bad_request() {
        assert_eq!(ApiError::NoCoins.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_coin_data_starts_empty() {
        let Json(data) = coin_data_handler(State(stub_state())).await;
        assert!(data.coins.is_empty());
    }

    #[test]
    fn test_poll_response_serialization() {
        let response = PollResponse {
            success: true,
            coins: vec![PriceSnapshot::new("bitcoin", 6.0, 50000.0)],
            assessments: Vec::new(),
            notification: None,
            message: "Poll completed successfully".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["coins"][0]["assetId"], "bitcoin");
        assert!(json["notification"].is_null());
    }

    #[tokio::test]
    async fn test_router_builds() {
        let _router = create_router(stub_state());
    }
}
