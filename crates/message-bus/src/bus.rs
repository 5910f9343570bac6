use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{BusMessage, Offset, Result, Topic};

/// A live stream of messages delivered from one topic.
pub type MessageStream = Pin<Box<dyn Stream<Item = BusMessage> + Send>>;

/// Core trait for broker implementations.
///
/// The bus owns delivery: ordering among messages sharing a key, redelivery and
/// consumer-group bookkeeping are its concern, not the caller's.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes a message to `topic` under the partition `key`.
    ///
    /// Returns the offset assigned to the message.
    async fn publish(&self, topic: Topic, key: &str, payload: Vec<u8>) -> Result<Offset>;

    /// Subscribes to messages published to `topic` after this call.
    ///
    /// Messages are yielded in publish order.
    async fn subscribe(&self, topic: Topic) -> Result<MessageStream>;

    /// Returns true once the bus has stopped accepting publishes.
    async fn is_closed(&self) -> bool;
}

#[async_trait]
impl<B: MessageBus + ?Sized> MessageBus for std::sync::Arc<B> {
    async fn publish(&self, topic: Topic, key: &str, payload: Vec<u8>) -> Result<Offset> {
        (**self).publish(topic, key, payload).await
    }

    async fn subscribe(&self, topic: Topic) -> Result<MessageStream> {
        (**self).subscribe(topic).await
    }

    async fn is_closed(&self) -> bool {
        (**self).is_closed().await
    }
}
