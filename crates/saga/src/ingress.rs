//! Originates `OrderCreated` events from external create-order requests.

use std::sync::Arc;

use common::{Topic, new_identifier};
use message_bus::MessageBus;
use serde::{Deserialize, Serialize};

use crate::envelope::{EncodeError, EventEnvelope};
use crate::error::Result;
use crate::sink::MetricsSink;

/// `eventType` of the first envelope of every order.
pub const ORDER_CREATED: &str = "OrderCreated";

/// Counter incremented for every order published.
pub const CREATED_COUNTER: &str = "orders_created_total";

/// Body of a create-order request. Missing fields take their defaults and
/// unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub items: Vec<String>,
    pub total_amount: i64,
}

/// Identifiers assigned to an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAccepted {
    pub order_id: String,
    pub correlation_id: String,
}

/// The sole entry point into the pipeline.
pub struct OrderIngress<B> {
    bus: B,
    metrics: Arc<dyn MetricsSink>,
}

impl<B: MessageBus> OrderIngress<B> {
    /// Creates an ingress publishing to `bus`.
    pub fn new(bus: B, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { bus, metrics }
    }

    /// Wraps the request in a fresh `OrderCreated` envelope and publishes it
    /// to `order.created`, keyed by the new order ID.
    #[tracing::instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderAccepted> {
        let order_id = new_identifier();
        let correlation_id = new_identifier();

        let envelope = EventEnvelope::builder()
            .event_type(ORDER_CREATED)
            .order_id(order_id.as_str())
            .correlation_id(correlation_id.as_str())
            .payload(request)
            .map_err(EncodeError::from)?
            .build();

        let bytes = envelope.encode()?;
        self.bus.publish(Topic::OrderCreated, &order_id, bytes).await?;
        self.metrics.increment(CREATED_COUNTER);

        tracing::info!(%order_id, %correlation_id, "order created");

        Ok(OrderAccepted {
            order_id,
            correlation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use message_bus::{BusError, InMemoryBus};
    use serde_json::json;

    use super::*;
    use crate::error::SagaError;
    use crate::sink::InMemoryMetrics;

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: "cust-1".to_string(),
            items: vec!["sku-1".to_string(), "sku-2".to_string()],
            total_amount: 9999,
        }
    }

    #[tokio::test]
    async fn test_create_order_publishes_order_created() {
        let bus = InMemoryBus::new();
        let metrics = InMemoryMetrics::new();
        let ingress = OrderIngress::new(bus.clone(), Arc::new(metrics.clone()));

        let accepted = ingress.create_order(&request()).await.unwrap();

        let messages = bus.messages(Topic::OrderCreated).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].key, accepted.order_id);

        let envelope = EventEnvelope::decode(&messages[0].payload).unwrap();
        assert_eq!(envelope.event_type(), Some("OrderCreated"));
        assert_eq!(envelope.order_id(), Some(accepted.order_id.as_str()));
        assert_eq!(envelope.correlation_id(), Some(accepted.correlation_id.as_str()));
        assert_eq!(
            envelope.payload(),
            Some(&json!({"customerId": "cust-1", "items": ["sku-1", "sku-2"], "totalAmount": 9999}))
        );
        assert_eq!(metrics.get(CREATED_COUNTER), 1);
    }

    #[tokio::test]
    async fn test_each_order_gets_fresh_identifiers() {
        let bus = InMemoryBus::new();
        let ingress = OrderIngress::new(bus, Arc::new(InMemoryMetrics::new()));

        let a = ingress.create_order(&request()).await.unwrap();
        let b = ingress.create_order(&request()).await.unwrap();

        assert_ne!(a.order_id, b.order_id);
        assert_ne!(a.correlation_id, b.correlation_id);
        assert_ne!(a.order_id, a.correlation_id);
    }

    #[tokio::test]
    async fn test_publish_failure_is_returned() {
        let bus = InMemoryBus::new();
        let metrics = InMemoryMetrics::new();
        bus.set_fail_on_publish(Topic::OrderCreated, true).await;
        let ingress = OrderIngress::new(bus, Arc::new(metrics.clone()));

        let result = ingress.create_order(&request()).await;

        assert!(matches!(result, Err(SagaError::Bus(BusError::PublishRejected { .. }))));
        assert_eq!(metrics.get(CREATED_COUNTER), 0);
    }

    #[test]
    fn test_request_defaults_and_unknown_fields() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"customerId":"c","coupon":"X"}"#).unwrap();
        assert_eq!(request.customer_id, "c");
        assert!(request.items.is_empty());
        assert_eq!(request.total_amount, 0);
    }
}
