//! Choreographed saga for order processing.
//!
//! Each relay stage subscribes to one topic, validates and transforms the
//! event envelope, and publishes a derived event to the next topic, or to the
//! shared `order.failed` topic on any error. Stages never call each other;
//! coordination happens entirely through the message bus:
//!
//! 1. Validate the order (`order.created` → `order.validated`)
//! 2. Reserve inventory (`order.validated` → `order.inventory-reserved`)
//! 3. Complete payment (`order.inventory-reserved` → `order.payment-completed`)
//! 4. Notify (`order.payment-completed` → `order.completed`)
//!
//! Delivery is at least once. There is no compensation: a failure event is
//! the terminal signal for an order.

pub mod envelope;
pub mod error;
pub mod failure;
pub mod ingress;
pub mod monitor;
pub mod pipeline;
pub mod relay;
pub mod sink;
pub mod stages;
pub mod transform;
pub mod validator;

pub use envelope::{DecodeError, EncodeError, EventEnvelope, EventEnvelopeBuilder};
pub use error::SagaError;
pub use failure::FailureEmitter;
pub use ingress::{CreateOrderRequest, OrderAccepted, OrderIngress};
pub use monitor::{DeadLetterMonitor, FailureReport};
pub use pipeline::Pipeline;
pub use relay::{Outcome, RelayStage};
pub use sink::{InMemoryMetrics, MetricsSink, RecorderSink};
pub use stages::StageDefinition;
pub use validator::{EnvelopeValidator, RequiredFields};
