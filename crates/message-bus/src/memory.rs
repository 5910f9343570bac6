use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream;
use tokio::sync::{RwLock, mpsc};

use crate::{BusError, BusMessage, MessageBus, MessageStream, Offset, Result, Topic};

#[derive(Default)]
struct BusState {
    logs: HashMap<Topic, Vec<BusMessage>>,
    failing: HashSet<Topic>,
    subscribers: HashMap<Topic, Vec<mpsc::UnboundedSender<BusMessage>>>,
    closed: bool,
}

/// In-memory broker for tests and single-process deployments.
///
/// Every published message is appended to a per-topic log that can be
/// inspected afterwards, and handed to each live subscriber of its topic
/// through that subscriber's own unbounded queue. A slow subscriber only
/// grows its queue; it never loses messages. Offsets are assigned under the
/// same lock as delivery, so subscribers observe messages in offset order.
#[derive(Clone, Default)]
pub struct InMemoryBus {
    state: Arc<RwLock<BusState>>,
}

impl InMemoryBus {
    /// Creates a new, open bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message published to `topic`, oldest first.
    pub async fn messages(&self, topic: Topic) -> Vec<BusMessage> {
        self.state
            .read()
            .await
            .logs
            .get(&topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of messages published to `topic`.
    pub async fn message_count(&self, topic: Topic) -> usize {
        self.state
            .read()
            .await
            .logs
            .get(&topic)
            .map_or(0, Vec::len)
    }

    /// Configures publishes to `topic` to be rejected.
    pub async fn set_fail_on_publish(&self, topic: Topic, fail: bool) {
        let mut state = self.state.write().await;
        if fail {
            state.failing.insert(topic);
        } else {
            state.failing.remove(&topic);
        }
    }

    /// Shuts the bus down. Live subscriptions end once drained and further
    /// publishes or subscriptions fail with [`BusError::Closed`].
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.closed = true;
        // Dropping the senders ends each stream after its queued messages.
        state.subscribers.clear();
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: Topic, key: &str, payload: Vec<u8>) -> Result<Offset> {
        let mut state = self.state.write().await;

        if state.closed {
            return Err(BusError::Closed);
        }

        if state.failing.contains(&topic) {
            return Err(BusError::PublishRejected {
                topic,
                reason: "broker unavailable".to_string(),
            });
        }

        let log = state.logs.entry(topic).or_default();
        let offset = log.last().map_or(Offset::initial(), |m| m.offset).next();
        let message = BusMessage {
            topic,
            key: key.to_string(),
            payload,
            offset,
            published_at: Utc::now(),
        };
        log.push(message.clone());

        if let Some(subscribers) = state.subscribers.get_mut(&topic) {
            // A send only fails once the receiving stream has been dropped.
            subscribers.retain(|subscriber| subscriber.send(message.clone()).is_ok());
        }

        metrics::counter!("bus_messages_published_total", "topic" => topic.as_str()).increment(1);
        tracing::trace!(%topic, key, %offset, "message published");

        Ok(offset)
    }

    async fn subscribe(&self, topic: Topic) -> Result<MessageStream> {
        let mut state = self.state.write().await;
        if state.closed {
            return Err(BusError::Closed);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        state.subscribers.entry(topic).or_default().push(sender);
        tracing::debug!(%topic, "subscriber registered");

        let stream = stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|message| (message, receiver))
        });

        Ok(Box::pin(stream))
    }

    async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }
}
