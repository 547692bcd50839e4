//! HTTP surface: the tweet webhook plus a health probe.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::model::InboundTweet;
use crate::pipeline::{IngestOutcome, Pipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/webhook/tweet", post(receive_tweet))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct WebhookResp {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tweet_id: Option<String>,
}

impl WebhookResp {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            tweet_id: None,
        }
    }
}

/// Webhook entrypoint. Internal details stay in the logs; callers get a
/// small status/message pair.
async fn receive_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<InboundTweet>,
) -> (StatusCode, Json<WebhookResp>) {
    let secret = headers
        .get("X-Webhook-Secret")
        .and_then(|v| v.to_str().ok());

    match state.pipeline.ingest(secret, event).await {
        Ok(IngestOutcome::Accepted { post_id }) => (
            StatusCode::OK,
            Json(WebhookResp {
                status: "success",
                message: "tweet processed".to_string(),
                tweet_id: Some(post_id),
            }),
        ),
        Ok(IngestOutcome::RejectedAuth) => (
            StatusCode::UNAUTHORIZED,
            Json(WebhookResp::error("authentication failed")),
        ),
        Ok(IngestOutcome::NoProject) => (
            StatusCode::NOT_FOUND,
            Json(WebhookResp::error("no matching project")),
        ),
        Err(e) => {
            error!(error = %e, "tweet ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookResp::error("processing failed")),
            )
        }
    }
}
