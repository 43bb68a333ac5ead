//! Shared types and rules for the Inventory Tracker
//!
//! This crate contains the domain model and the pure business rules shared
//! between the backend and the browser form (via WASM): normalization,
//! reconciliation planning, and the undo/redo history.

pub mod history;
pub mod models;
pub mod reconcile;
pub mod types;
pub mod validation;

pub use history::*;
pub use models::*;
pub use reconcile::*;
pub use types::*;
pub use validation::*;
