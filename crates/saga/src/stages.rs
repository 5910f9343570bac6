//! The four relay hops of the order lifecycle.
//!
//! ```text
//! order.created ─► validator ─► order.validated ─► inventory ─► order.inventory-reserved
//!   ─► payment ─► order.payment-completed ─► notification ─► order.completed
//! ```
//!
//! Every hop writes to `order.failed` when it cannot relay a message.

use common::Topic;

/// The columns that distinguish one relay stage from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDefinition {
    /// Short stage name used in logs.
    pub name: &'static str,
    /// Consumer group the stage subscribes under.
    pub consumer_group: &'static str,
    /// Topic the stage consumes.
    pub input: Topic,
    /// Topic the stage publishes admissible envelopes to.
    pub output: Topic,
    /// `eventType` of the success envelope.
    pub success_event: &'static str,
    /// `eventType` of the failure envelope.
    pub failure_event: &'static str,
    /// Prefix of the failure reason for inadmissible envelopes.
    pub failure_prefix: &'static str,
    /// Counter incremented after a successful relay.
    pub success_counter: &'static str,
    /// Counter incremented before every failure publish.
    pub failure_counter: &'static str,
}

/// Prefix of the failure reason for undecodable messages, shared by all stages.
pub const PARSE_ERROR: &str = "PARSE_ERROR";

/// Suffix of the failure reason for inadmissible envelopes.
pub const MISSING_FIELDS: &str = "orderId or payload missing";

/// Topic every stage reports failures to.
pub const FAILURE_TOPIC: Topic = Topic::OrderFailed;

pub const VALIDATOR: StageDefinition = StageDefinition {
    name: "validator",
    consumer_group: "order-validator",
    input: Topic::OrderCreated,
    output: Topic::OrderValidated,
    success_event: "OrderValidated",
    failure_event: "OrderValidationFailed",
    failure_prefix: "VALIDATION_FAILED",
    success_counter: "orders_validated_total",
    failure_counter: "orders_validation_failed_total",
};

pub const INVENTORY: StageDefinition = StageDefinition {
    name: "inventory",
    consumer_group: "inventory-reserved",
    input: Topic::OrderValidated,
    output: Topic::InventoryReserved,
    success_event: "InventoryReserved",
    failure_event: "OrderInventoryFailed",
    failure_prefix: "INVENTORY_FAILED",
    success_counter: "orders_reserved_total",
    failure_counter: "orders_inventory_failed_total",
};

pub const PAYMENT: StageDefinition = StageDefinition {
    name: "payment",
    consumer_group: "payment-completed",
    input: Topic::InventoryReserved,
    output: Topic::PaymentCompleted,
    success_event: "PaymentCompleted",
    failure_event: "OrderPaymentFailed",
    failure_prefix: "PAYMENT_FAILED",
    success_counter: "orders_paid_total",
    failure_counter: "orders_payment_failed_total",
};

pub const NOTIFICATION: StageDefinition = StageDefinition {
    name: "notification",
    consumer_group: "notification-service",
    input: Topic::PaymentCompleted,
    output: Topic::OrderCompleted,
    success_event: "OrderCompleted",
    failure_event: "OrderNotificationFailed",
    failure_prefix: "NOTIFICATION_FAILED",
    success_counter: "orders_completed_total",
    failure_counter: "orders_notification_failed_total",
};

/// All relay stages in lifecycle order.
pub const ALL_STAGES: [StageDefinition; 4] = [VALIDATOR, INVENTORY, PAYMENT, NOTIFICATION];

impl StageDefinition {
    /// Failure reason for an envelope the validator rejected.
    pub fn rejection_reason(&self) -> String {
        format!("{}: {}", self.failure_prefix, MISSING_FIELDS)
    }
}

/// Failure reason for a message that could not be decoded.
pub fn parse_error_reason(detail: impl std::fmt::Display) -> String {
    format!("{PARSE_ERROR}: {detail}")
}
