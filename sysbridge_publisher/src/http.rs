//! The publisher's trigger surface.
//!
//! Mirrors the broker's at-most-once posture: a failed trigger reports
//! a structured error body with a normal HTTP status and the caller
//! decides whether to trigger again.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::error;

use sysbridge::publish::publish_current_metrics;
use sysbridge::{BrokerConfig, MetricsSource, Snapshot};

#[derive(Clone)]
pub struct PublisherState {
    pub source: Arc<MetricsSource>,
    pub broker: BrokerConfig,
}

/// Status envelope returned by `/publish`.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Snapshot>,
}

pub fn publisher_router(state: PublisherState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/publish", get(publish))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "System Info Publisher Service" }))
}

async fn publish(State(state): State<PublisherState>) -> Json<PublishResponse> {
    match publish_current_metrics(&state.source, &state.broker).await {
        Ok(snapshot) => Json(PublishResponse {
            status: "success",
            message: "System information published".into(),
            data: Some(snapshot),
        }),
        Err(e) => {
            error!("publish trigger failed: {e}");
            Json(PublishResponse {
                status: "error",
                message: e.to_string(),
                data: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_broker() -> BrokerConfig {
        BrokerConfig {
            // Port 1 on loopback: refused immediately, no broker needed.
            host: "127.0.0.1".into(),
            port: 1,
            exchange: "system_info".into(),
            exchange_type: "fanout".into(),
            queue: "Consumer".into(),
            queue_exclusive: true,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn unreachable_broker_yields_error_status_body() {
        let state = PublisherState {
            source: Arc::new(MetricsSource::new(std::path::PathBuf::from("/"))),
            broker: unreachable_broker(),
        };

        let Json(body) = publish(State(state)).await;
        assert_eq!(body.status, "error");
        assert!(body.data.is_none());
        assert!(!body.message.is_empty());
    }

    #[test]
    fn error_response_omits_data_field() {
        let body = PublishResponse {
            status: "error",
            message: "broker unavailable".into(),
            data: None,
        };
        let v: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(v["status"], "error");
        assert!(v.get("data").is_none());
    }
}
