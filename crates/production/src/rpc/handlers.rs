//! HTTP request handlers for the RPC API.

use super::state::RpcState;
use super::types::*;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

/// Handler for `GET /health` - liveness probe.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Handler for `GET /ready` - readiness probe.
pub async fn ready_handler(State(state): State<RpcState>) -> impl IntoResponse {
    if state.is_ready() {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready".to_string(),
                ready: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not_ready".to_string(),
                ready: false,
            }),
        )
    }
}

/// Handler for `GET /metrics` - Prometheus metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    match deadman_metrics_prometheus::encode_metrics() {
        Ok((content_type, buffer)) => {
            ([(axum::http::header::CONTENT_TYPE, content_type)], buffer).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// Handler for `GET /api/v1/status` - escrow status.
pub async fn status_handler(State(state): State<RpcState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let status = state.status.borrow().clone();
    Json(StatusResponse::from_status(&status, uptime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::EscrowStatus;
    use axum::{body::Body, http::Request, Router};
    use std::sync::atomic::Ordering;
    use tokio::sync::watch;
    use tower::ServiceExt;

    fn create_test_state() -> RpcState {
        let (_tx, rx) = watch::channel(EscrowStatus::default());
        RpcState::new(rx)
    }

    #[tokio::test]
    async fn test_health_handler() {
        let app = Router::new()
            .route("/health", axum::routing::get(health_handler))
            .with_state(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_handler_not_ready() {
        let app = Router::new()
            .route("/ready", axum::routing::get(ready_handler))
            .with_state(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ready_handler_ready() {
        let state = create_test_state();
        state.ready.store(true, Ordering::SeqCst);
        let app = Router::new()
            .route("/ready", axum::routing::get(ready_handler))
            .with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
