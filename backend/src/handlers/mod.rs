//! HTTP handlers for the Inventory Tracker API

pub mod health;
pub mod history;
pub mod inventory;
pub mod order;
pub mod reporting;

pub use health::*;
pub use history::*;
pub use inventory::*;
pub use order::*;
pub use reporting::*;
