//! Saga error types.

use message_bus::BusError;
use thiserror::Error;

use crate::envelope::EncodeError;

/// Errors that escape a stage's message-handling boundary.
///
/// Decode and validation failures never appear here: they are converted into
/// published failure events. Only success-path faults surface, leaving the
/// message to the broker's redelivery.
#[derive(Debug, Error)]
pub enum SagaError {
    /// An outbound envelope could not be serialized.
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The message bus rejected a publish or subscription.
    #[error("Message bus error: {0}")]
    Bus(#[from] BusError),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
