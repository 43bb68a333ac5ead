//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{ChangeSummary, EditedRow, InventoryRecord, InventoryStats, RecordFields};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::{HistoryService, InventoryService, ReconcileService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// Input for the add-item form
#[derive(Debug, Deserialize, Validate)]
pub struct AddItemInput {
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    #[validate(length(min = 1, message = "Product ID is required"))]
    pub product_id: String,
    #[validate(range(min = 0, message = "Minimum quantity cannot be negative"))]
    pub minimum_individual_quantity: Option<i64>,
    #[validate(range(min = 0, message = "Current amount cannot be negative"))]
    pub current_amount: Option<i64>,
    pub per_package: Option<i64>,
    pub per_box: Option<i64>,
    pub per_case: Option<i64>,
    pub cost: Option<Decimal>,
    pub last_checked: Option<NaiveDate>,
}

impl AddItemInput {
    fn into_fields(self, today: NaiveDate) -> RecordFields {
        RecordFields {
            brand: self.brand,
            product_name: self.product_name,
            product_id: self.product_id,
            minimum_individual_quantity: self.minimum_individual_quantity.unwrap_or(0),
            current_amount: self.current_amount.unwrap_or(0),
            per_package: self.per_package,
            per_box: self.per_box,
            per_case: self.per_case,
            cost: self.cost.unwrap_or(Decimal::ZERO),
            last_checked: self.last_checked.unwrap_or(today),
        }
    }
}

/// Grid contents submitted by a bulk save
#[derive(Debug, Deserialize)]
pub struct BulkSaveInput {
    /// Filter the grid was showing; the save only touches those records
    #[serde(default)]
    pub search: Option<String>,
    pub rows: Vec<EditedRow>,
}

#[derive(Debug, Serialize)]
pub struct BulkSaveResponse {
    pub summary: ChangeSummary,
    pub message: String,
    pub records: Vec<InventoryRecord>,
}

/// List records, optionally filtered
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<InventoryRecord>>> {
    let service = InventoryService::new(state.db);
    let records = service.list(query.search.as_deref()).await?;
    Ok(Json(records))
}

/// Add one record; the previous table is recorded for undo
pub async fn add_item(
    State(state): State<AppState>,
    Json(input): Json<AddItemInput>,
) -> AppResult<(StatusCode, Json<InventoryRecord>)> {
    input.validate()?;

    let mut session = state.session.lock().await;
    let snapshot = HistoryService::new(state.db.clone()).capture("add").await?;

    let service = InventoryService::new(state.db.clone());
    let record = service
        .insert(input.into_fields(Utc::now().date_naive()))
        .await?;
    session.record(snapshot).await;

    tracing::info!(product_id = %record.product_id, "Added inventory item");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Reconcile the edited grid against the store
pub async fn bulk_save(
    State(state): State<AppState>,
    Json(input): Json<BulkSaveInput>,
) -> AppResult<Json<BulkSaveResponse>> {
    let mut session = state.session.lock().await;
    let snapshot = HistoryService::new(state.db.clone()).capture("save").await?;

    let filter = input.search.as_deref();
    let summary = ReconcileService::new(state.db.clone())
        .apply(filter, &input.rows)
        .await?;
    if !summary.is_empty() {
        session.record(snapshot).await;
    }

    let records = InventoryService::new(state.db).list(filter).await?;
    Ok(Json(BulkSaveResponse {
        summary,
        message: summary.message(),
        records,
    }))
}

/// Records at or below their minimum
pub async fn list_low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryRecord>>> {
    let service = InventoryService::new(state.db);
    let records = service.low_stock().await?;
    Ok(Json(records))
}

/// Quick stats
pub async fn get_inventory_stats(State(state): State<AppState>) -> AppResult<Json<InventoryStats>> {
    let service = InventoryService::new(state.db);
    let stats = service.stats().await?;
    Ok(Json(stats))
}

/// Get one record by id
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<InventoryRecord>> {
    let service = InventoryService::new(state.db);
    let record = service.get(id).await?;
    Ok(Json(record))
}
