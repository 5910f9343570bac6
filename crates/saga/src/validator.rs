//! Admission checks applied before a stage relays an envelope.

use crate::envelope::EventEnvelope;

/// Decides whether an inbound envelope may continue down the success path.
///
/// Implementations must be pure: no I/O and no side effects.
pub trait EnvelopeValidator: Send + Sync {
    /// Returns true if the envelope is admissible.
    fn is_admissible(&self, envelope: &EventEnvelope) -> bool;
}

/// The uniform rule used by every stage: `orderId` must be non-empty and
/// `payload` must be present. The payload is not inspected further.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFields;

impl EnvelopeValidator for RequiredFields {
    fn is_admissible(&self, envelope: &EventEnvelope) -> bool {
        envelope.order_id().is_some_and(|id| !id.is_empty()) && envelope.payload().is_some()
    }
}

impl<F> EnvelopeValidator for F
where
    F: Fn(&EventEnvelope) -> bool + Send + Sync,
{
    fn is_admissible(&self, envelope: &EventEnvelope) -> bool {
        self(envelope)
    }
}
