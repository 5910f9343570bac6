use chrono::{DateTime, Utc};

use crate::Topic;

/// Position of a message within its topic's log.
///
/// Offsets start at 1 for the first message on a topic and increment by 1
/// for each subsequent publish to the same topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(u64);

impl Offset {
    /// Creates an offset from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the offset preceding the first message (0).
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next offset.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message as stored on, and delivered by, the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// The topic the message was published to.
    pub topic: Topic,

    /// Partition key. All messages sharing a key are delivered in publish order.
    pub key: String,

    /// Raw message body.
    pub payload: Vec<u8>,

    /// Position within the topic.
    pub offset: Offset,

    /// When the bus accepted the message.
    pub published_at: DateTime<Utc>,
}
