//! Shared types for the order saga pipeline.

pub mod types;

pub use types::{Topic, UNKNOWN, new_identifier};
