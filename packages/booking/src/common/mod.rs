// Common types and utilities shared across the booking domains

pub mod entity_ids;
pub mod id;
pub mod time;
pub mod validate;

pub use entity_ids::*;
pub use id::Id;
