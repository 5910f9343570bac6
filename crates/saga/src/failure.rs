//! Failure-path envelope construction and best-effort publishing.

use std::sync::Arc;

use common::UNKNOWN;
use message_bus::{MessageBus, Offset};
use serde_json::{Value, json};

use crate::envelope::EventEnvelope;
use crate::sink::MetricsSink;
use crate::stages::{FAILURE_TOPIC, StageDefinition};

/// Placeholder for the original payload when nothing could be decoded.
pub const NO_PAYLOAD: &str = "n/a";

/// Publishes a stage's failure events to the shared failure topic.
///
/// Emission is best effort: a failed publish is logged and swallowed, never
/// returned to the calling stage.
pub struct FailureEmitter<B> {
    stage: StageDefinition,
    bus: B,
    metrics: Arc<dyn MetricsSink>,
}

impl<B: MessageBus> FailureEmitter<B> {
    /// Creates an emitter for the given stage.
    pub fn new(stage: StageDefinition, bus: B, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            stage,
            bus,
            metrics,
        }
    }

    /// Builds the failure envelope for `inbound`, which is `None` when the
    /// message could not be decoded.
    pub fn failure_envelope(&self, inbound: Option<&EventEnvelope>, reason: &str) -> EventEnvelope {
        let order_id = inbound
            .and_then(EventEnvelope::order_id)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN);
        let correlation_id = inbound
            .and_then(EventEnvelope::correlation_id)
            .unwrap_or(UNKNOWN);
        let original_payload = match inbound {
            Some(envelope) => envelope.payload().cloned().unwrap_or(Value::Null),
            None => Value::from(NO_PAYLOAD),
        };

        EventEnvelope::builder()
            .event_type(self.stage.failure_event)
            .order_id(order_id)
            .correlation_id(correlation_id)
            .payload_raw(json!({
                "originalPayload": original_payload,
                "failureReason": reason,
            }))
            .build()
    }

    /// Counts the failure, then publishes it keyed by the order ID (or
    /// `"unknown"`). Returns the offset if the publish went through.
    pub async fn emit(&self, inbound: Option<&EventEnvelope>, reason: &str) -> Option<Offset> {
        self.metrics.increment(self.stage.failure_counter);

        let failed = self.failure_envelope(inbound, reason);
        let key = failed.order_id().unwrap_or(UNKNOWN);

        let bytes = match failed.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(
                    stage = self.stage.name,
                    order_id = key,
                    error = %e,
                    "failed to encode failure event"
                );
                return None;
            }
        };

        match self.bus.publish(FAILURE_TOPIC, key, bytes).await {
            Ok(offset) => {
                tracing::info!(
                    stage = self.stage.name,
                    order_id = key,
                    reason,
                    "failure event published"
                );
                Some(offset)
            }
            Err(e) => {
                tracing::error!(
                    stage = self.stage.name,
                    order_id = key,
                    error = %e,
                    "failed to publish failure event"
                );
                None
            }
        }
    }
}
