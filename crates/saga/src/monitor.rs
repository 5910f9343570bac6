//! Observer of the shared failure topic.

use std::sync::Arc;

use common::UNKNOWN;
use futures_util::StreamExt;
use message_bus::{BusMessage, MessageStream};

use crate::envelope::EventEnvelope;
use crate::sink::MetricsSink;

/// Counter incremented for every failure event observed.
pub const FAILED_OBSERVED_COUNTER: &str = "orders_failed_observed_total";

/// A failure event as seen on `order.failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub order_id: String,
    pub correlation_id: String,
    pub event_type: String,
    pub failure_reason: String,
}

impl FailureReport {
    fn from_envelope(envelope: &EventEnvelope) -> Self {
        let failure_reason = envelope
            .payload()
            .and_then(|p| p.get("failureReason"))
            .and_then(|r| r.as_str())
            .unwrap_or_default();

        Self {
            order_id: envelope.order_id().unwrap_or(UNKNOWN).to_string(),
            correlation_id: envelope.correlation_id().unwrap_or(UNKNOWN).to_string(),
            event_type: envelope.event_type().unwrap_or_default().to_string(),
            failure_reason: failure_reason.to_string(),
        }
    }
}

/// Logs every failure event and counts it. Never publishes.
pub struct DeadLetterMonitor {
    metrics: Arc<dyn MetricsSink>,
}

impl DeadLetterMonitor {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self { metrics }
    }

    /// Records one message from the failure topic. Returns `None` if the
    /// message is not a decodable envelope.
    pub fn observe(&self, message: &BusMessage) -> Option<FailureReport> {
        let envelope = match EventEnvelope::decode(&message.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    key = %message.key,
                    offset = %message.offset,
                    error = %e,
                    "undecodable failure event"
                );
                return None;
            }
        };

        let report = FailureReport::from_envelope(&envelope);
        self.metrics.increment(FAILED_OBSERVED_COUNTER);
        tracing::warn!(
            order_id = %report.order_id,
            correlation_id = %report.correlation_id,
            event_type = %report.event_type,
            failure_reason = %report.failure_reason,
            "order failed"
        );

        Some(report)
    }

    /// Observes every message of `messages` until the stream ends.
    pub async fn run(&self, mut messages: MessageStream) {
        tracing::info!("dead-letter monitor started");
        while let Some(message) = messages.next().await {
            self.observe(&message);
        }
        tracing::info!("dead-letter monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::Topic;
    use message_bus::Offset;

    use super::*;
    use crate::sink::InMemoryMetrics;

    fn message(payload: &[u8]) -> BusMessage {
        BusMessage {
            topic: Topic::OrderFailed,
            key: "ord-1".to_string(),
            payload: payload.to_vec(),
            offset: Offset::new(1),
            published_at: Utc::now(),
        }
    }

    #[test]
    fn test_observe_failure_event() {
        let metrics = InMemoryMetrics::new();
        let monitor = DeadLetterMonitor::new(Arc::new(metrics.clone()));
        let raw = br#"{"eventType":"OrderPaymentFailed","orderId":"ord-1","correlationId":"corr-1","timestamp":"2026-02-06T12:00:00Z","payload":{"originalPayload":null,"failureReason":"PAYMENT_FAILED: orderId or payload missing"}}"#;

        let report = monitor.observe(&message(raw)).unwrap();

        assert_eq!(
            report,
            FailureReport {
                order_id: "ord-1".to_string(),
                correlation_id: "corr-1".to_string(),
                event_type: "OrderPaymentFailed".to_string(),
                failure_reason: "PAYMENT_FAILED: orderId or payload missing".to_string(),
            }
        );
        assert_eq!(metrics.get(FAILED_OBSERVED_COUNTER), 1);
    }

    #[test]
    fn test_observe_undecodable_message() {
        let metrics = InMemoryMetrics::new();
        let monitor = DeadLetterMonitor::new(Arc::new(metrics.clone()));

        assert!(monitor.observe(&message(b"garbage")).is_none());
        assert_eq!(metrics.get(FAILED_OBSERVED_COUNTER), 0);
    }

    #[test]
    fn test_observe_defaults_missing_fields() {
        let monitor = DeadLetterMonitor::new(Arc::new(InMemoryMetrics::new()));

        let report = monitor.observe(&message(b"{}")).unwrap();

        assert_eq!(report.order_id, "unknown");
        assert_eq!(report.correlation_id, "unknown");
        assert_eq!(report.failure_reason, "");
    }
}
