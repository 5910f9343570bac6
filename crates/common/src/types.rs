use uuid::Uuid;

/// Sentinel used for identity fields that could not be recovered from an
/// inbound message.
pub const UNKNOWN: &str = "unknown";

/// Generates a fresh random identifier for orders and correlation chains.
pub fn new_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// A named channel on the broker.
///
/// Every topic is written by exactly one producer role and read by exactly one
/// consumer role, except [`Topic::OrderFailed`], which every relay stage writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    OrderCreated,
    OrderValidated,
    InventoryReserved,
    PaymentCompleted,
    OrderCompleted,
    OrderFailed,
}

impl Topic {
    /// Returns the wire name of the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::OrderCreated => "order.created",
            Topic::OrderValidated => "order.validated",
            Topic::InventoryReserved => "order.inventory-reserved",
            Topic::PaymentCompleted => "order.payment-completed",
            Topic::OrderCompleted => "order.completed",
            Topic::OrderFailed => "order.failed",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
