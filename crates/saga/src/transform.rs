//! Success-path envelope construction.

use crate::envelope::EventEnvelope;
use crate::stages::StageDefinition;

/// Builds the envelope a stage relays for an admissible inbound envelope.
///
/// Identity fields and payload are carried over unchanged; only the event
/// type and timestamp are new.
pub fn transform(stage: &StageDefinition, inbound: &EventEnvelope) -> EventEnvelope {
    EventEnvelope::builder()
        .event_type(stage.success_event)
        .maybe_order_id(inbound.order_id())
        .maybe_correlation_id(inbound.correlation_id())
        .maybe_payload(inbound.payload())
        .build()
}
