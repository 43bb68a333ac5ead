//! Route definitions for the Inventory Tracker

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/inventory", inventory_routes())
        .nest("/history", history_routes())
        .nest("/order", order_routes())
        .nest("/reports", report_routes())
}

/// Inventory routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_inventory)
                .post(handlers::add_item)
                .put(handlers::bulk_save),
        )
        .route("/low-stock", get(handlers::list_low_stock))
        .route("/stats", get(handlers::get_inventory_stats))
        .route("/:id", get(handlers::get_item))
}

/// Undo/redo routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_history_status))
        .route("/undo", post(handlers::undo))
        .route("/redo", post(handlers::redo))
}

/// Purchase order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_order).delete(handlers::clear_order))
        .route("/lines", post(handlers::add_order_line))
        .route(
            "/lines/:product_id",
            put(handlers::update_order_line).delete(handlers::remove_order_line),
        )
        .route("/export", get(handlers::export_order))
}

/// Report and import routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory.csv", get(handlers::export_inventory_csv))
        .route("/inventory.html", get(handlers::export_inventory_html))
        .route("/import", post(handlers::import_inventory))
}
