//! The wire envelope shared by every stage, and its codec.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Inbound bytes were not a well-formed envelope document.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Outbound envelope could not be serialized.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// The one entity exchanged between stages.
///
/// Every field is optional on the wire: absence decodes successfully and is
/// left for the validator to judge. Fields outside the schema are ignored.
/// Envelopes are never mutated after construction; each hop builds a fresh
/// one through [`EventEnvelope::builder`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    event_type: Option<String>,
    order_id: Option<String>,
    correlation_id: Option<String>,
    timestamp: Option<String>,
    payload: Option<Value>,
}

impl EventEnvelope {
    /// Creates a new envelope builder.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }

    /// Decodes an envelope from raw message bytes.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Encodes the envelope as JSON bytes. Unset fields are written as `null`.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// The semantic kind of the event, e.g. `OrderValidated`.
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// The order identifier, also the partition key of every publish.
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    /// Identifier carried unchanged from the originating request.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// When the emitting stage last touched the envelope (ISO-8601).
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// The opaque payload. JSON `null` and absence both read as `None`.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// Current instant in the wire timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Builder for outbound envelopes.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_type: Option<String>,
    order_id: Option<String>,
    correlation_id: Option<String>,
    timestamp: Option<String>,
    payload: Option<Value>,
}

impl EventEnvelopeBuilder {
    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the order ID.
    pub fn order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    /// Sets the order ID if one is given.
    pub fn maybe_order_id(mut self, order_id: Option<&str>) -> Self {
        self.order_id = order_id.map(str::to_string);
        self
    }

    /// Sets the correlation ID.
    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Sets the correlation ID if one is given.
    pub fn maybe_correlation_id(mut self, correlation_id: Option<&str>) -> Self {
        self.correlation_id = correlation_id.map(str::to_string);
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value. `Value::Null` leaves it unset.
    pub fn payload_raw(mut self, payload: Value) -> Self {
        self.payload = (!payload.is_null()).then_some(payload);
        self
    }

    /// Sets the payload if one is given.
    pub fn maybe_payload(mut self, payload: Option<&Value>) -> Self {
        self.payload = payload.filter(|p| !p.is_null()).cloned();
        self
    }

    /// Builds the envelope, stamping the current time if no timestamp was set.
    pub fn build(self) -> EventEnvelope {
        EventEnvelope {
            event_type: self.event_type,
            order_id: self.order_id,
            correlation_id: self.correlation_id,
            timestamp: Some(self.timestamp.unwrap_or_else(now_timestamp)),
            payload: self.payload,
        }
    }
}
