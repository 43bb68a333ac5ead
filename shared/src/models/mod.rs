//! Domain models for the Inventory Tracker

mod inventory;
mod order;
mod snapshot;

pub use inventory::*;
pub use order::*;
pub use snapshot::*;
