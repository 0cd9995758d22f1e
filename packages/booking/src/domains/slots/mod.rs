pub mod commands;
pub mod generator;
pub mod models;

pub use commands::{SlotQueryInput, ValidatedSlotQuery};
pub use generator::{generate_slots, SlotContext};
pub use models::slot::Slot;
