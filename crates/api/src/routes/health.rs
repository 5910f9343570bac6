//! Liveness of the ingress and the bus behind it.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use message_bus::MessageBus;
use serde::Serialize;

use super::orders::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub bus: &'static str,
}

/// GET /health: 200 while orders are accepted, 503 once the bus is draining.
pub async fn check<B: MessageBus + 'static>(
    State(state): State<Arc<AppState<B>>>,
) -> (StatusCode, Json<HealthResponse>) {
    if state.bus.is_closed().await {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "draining",
                bus: "closed",
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                bus: "open",
            }),
        )
    }
}
