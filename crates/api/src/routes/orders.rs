//! Create-order ingress endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use message_bus::MessageBus;
use saga::{CreateOrderRequest, OrderAccepted, OrderIngress};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<B> {
    pub ingress: OrderIngress<B>,
    pub bus: B,
}

/// POST /api/v1/orderApi/orders: publish a new `OrderCreated` event.
#[tracing::instrument(skip(state, req))]
pub async fn create<B: MessageBus + 'static>(
    State(state): State<Arc<AppState<B>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderAccepted>, ApiError> {
    let accepted = state.ingress.create_order(&req).await?;
    Ok(Json(accepted))
}
