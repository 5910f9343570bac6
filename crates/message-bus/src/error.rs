use thiserror::Error;

use crate::Topic;

/// Errors that can occur when interacting with the message bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The broker refused or failed to accept a message.
    #[error("Publish to {topic} rejected: {reason}")]
    PublishRejected { topic: Topic, reason: String },

    /// The bus has been shut down.
    #[error("Message bus closed")]
    Closed,
}

/// Result type for message bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
