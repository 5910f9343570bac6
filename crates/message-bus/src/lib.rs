pub mod bus;
pub mod error;
pub mod memory;
pub mod message;

pub use bus::{MessageBus, MessageStream};
pub use common::Topic;
pub use error::{BusError, Result};
pub use memory::InMemoryBus;
pub use message::{BusMessage, Offset};
