//! Business logic services for the Inventory Tracker

pub mod history;
pub mod import;
pub mod inventory;
pub mod order;
pub mod reconcile;
pub mod reporting;

pub use history::HistoryService;
pub use import::ImportService;
pub use inventory::InventoryService;
pub use order::OrderService;
pub use reconcile::ReconcileService;
pub use reporting::ReportingService;
