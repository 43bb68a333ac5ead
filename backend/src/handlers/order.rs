//! HTTP handlers for the purchase order

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::{OrderLine, OrderSummary};

use crate::error::{AppError, AppResult};
use crate::services::reporting::{order_filename, render_purchase_order};
use crate::services::OrderService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddOrderLineInput {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderLineInput {
    pub quantity: i64,
}

/// Current order with totals
pub async fn get_order(State(state): State<AppState>) -> Json<OrderSummary> {
    let session = state.session.lock().await;
    Json(session.order.summary())
}

/// Drop every line
pub async fn clear_order(State(state): State<AppState>) -> Json<OrderSummary> {
    let mut session = state.session.lock().await;
    session.order.clear();
    tracing::info!("Order cleared");
    Json(session.order.summary())
}

/// Add a stocked product, merging with an existing line
pub async fn add_order_line(
    State(state): State<AppState>,
    Json(input): Json<AddOrderLineInput>,
) -> AppResult<(StatusCode, Json<OrderLine>)> {
    let mut session = state.session.lock().await;
    let line = OrderService::new(state.db)
        .add_product(&mut session.order, &input.product_id, input.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(line)))
}

pub async fn update_order_line(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(input): Json<UpdateOrderLineInput>,
) -> AppResult<Json<OrderSummary>> {
    let mut session = state.session.lock().await;
    session.order.update_quantity(&product_id, input.quantity)?;
    Ok(Json(session.order.summary()))
}

pub async fn remove_order_line(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<OrderSummary>> {
    let mut session = state.session.lock().await;
    if !session.order.remove(&product_id) {
        return Err(AppError::NotFound(format!("Order line {}", product_id)));
    }
    Ok(Json(session.order.summary()))
}

/// Printable purchase order download
pub async fn export_order(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = state.session.lock().await;
    let now = Utc::now();
    let html = render_purchase_order(&session.order, now)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", order_filename(now)),
            ),
        ],
        html,
    ))
}
