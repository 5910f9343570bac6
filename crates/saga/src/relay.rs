//! The relay stage: decode, validate, then transform or fail.

use std::sync::Arc;

use common::UNKNOWN;
use futures_util::StreamExt;
use message_bus::{MessageBus, MessageStream, Offset};

use crate::envelope::EventEnvelope;
use crate::error::Result;
use crate::failure::FailureEmitter;
use crate::sink::MetricsSink;
use crate::stages::{StageDefinition, parse_error_reason};
use crate::transform::transform;
use crate::validator::{EnvelopeValidator, RequiredFields};

/// What became of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The envelope was admissible and relayed to the stage's output topic.
    Relayed { offset: Offset },

    /// The message was routed to the failure topic. `offset` is `None` when
    /// the failure publish itself did not go through.
    Rejected {
        reason: String,
        offset: Option<Offset>,
    },
}

/// One subscribe→process→publish unit, parameterized by a [`StageDefinition`].
///
/// Stages hold no state across messages. Redelivery of a message yields a
/// duplicate publish with a fresh timestamp; downstream stages must tolerate
/// duplicates per `orderId`.
pub struct RelayStage<B> {
    stage: StageDefinition,
    bus: B,
    validator: Arc<dyn EnvelopeValidator>,
    metrics: Arc<dyn MetricsSink>,
    failures: FailureEmitter<B>,
}

impl<B> RelayStage<B>
where
    B: MessageBus + Clone,
{
    /// Creates a stage using the uniform [`RequiredFields`] admission rule.
    pub fn new(stage: StageDefinition, bus: B, metrics: Arc<dyn MetricsSink>) -> Self {
        let failures = FailureEmitter::new(stage, bus.clone(), metrics.clone());
        Self {
            stage,
            bus,
            validator: Arc::new(RequiredFields),
            metrics,
            failures,
        }
    }

    /// Replaces the admission rule.
    pub fn with_validator(mut self, validator: impl EnvelopeValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Returns the stage's definition.
    pub fn definition(&self) -> &StageDefinition {
        &self.stage
    }

    /// Processes one raw inbound message to completion.
    ///
    /// Undecodable and inadmissible messages are converted into failure
    /// events and reported as [`Outcome::Rejected`]. An error is returned only
    /// when the success-path publish fails.
    #[tracing::instrument(skip(self, raw), fields(stage = self.stage.name))]
    pub async fn handle(&self, raw: &[u8]) -> Result<Outcome> {
        let envelope = match EventEnvelope::decode(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(topic = %self.stage.input, error = %e, "failed to parse message");
                let reason = parse_error_reason(&e);
                let offset = self.failures.emit(None, &reason).await;
                return Ok(Outcome::Rejected { reason, offset });
            }
        };

        if !self.validator.is_admissible(&envelope) {
            let reason = self.stage.rejection_reason();
            tracing::warn!(
                order_id = envelope.order_id().unwrap_or(UNKNOWN),
                %reason,
                "envelope rejected"
            );
            let offset = self.failures.emit(Some(&envelope), &reason).await;
            return Ok(Outcome::Rejected { reason, offset });
        }

        let relayed = transform(&self.stage, &envelope);
        let key = relayed.order_id().unwrap_or(UNKNOWN);
        let bytes = relayed.encode()?;
        let offset = self.bus.publish(self.stage.output, key, bytes).await?;
        self.metrics.increment(self.stage.success_counter);

        tracing::debug!(order_id = key, topic = %self.stage.output, %offset, "envelope relayed");

        Ok(Outcome::Relayed { offset })
    }

    /// Handles every message of `messages` until the stream ends.
    ///
    /// Errors are logged and the message is left to the broker's redelivery.
    pub async fn run(&self, mut messages: MessageStream) {
        tracing::info!(
            stage = self.stage.name,
            group = self.stage.consumer_group,
            topic = %self.stage.input,
            "relay stage started"
        );

        while let Some(message) = messages.next().await {
            if let Err(e) = self.handle(&message.payload).await {
                tracing::error!(
                    stage = self.stage.name,
                    key = %message.key,
                    offset = %message.offset,
                    error = %e,
                    "message processing failed"
                );
            }
        }

        tracing::info!(stage = self.stage.name, "relay stage stopped");
    }
}
