//! HTTP handlers for undo/redo

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{HistoryStatus, InventoryRecord};

use crate::error::AppResult;
use crate::services::{HistoryService, InventoryService};
use crate::AppState;

/// Result of an undo or redo: the restored table and the new stack state
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub message: String,
    pub status: HistoryStatus,
    pub records: Vec<InventoryRecord>,
}

/// Undo/redo availability
pub async fn get_history_status(State(state): State<AppState>) -> Json<HistoryStatus> {
    let session = state.session.lock().await;
    Json(session.history.status())
}

pub async fn undo(State(state): State<AppState>) -> AppResult<Json<HistoryResponse>> {
    let mut session = state.session.lock().await;
    let restored = HistoryService::new(state.db.clone())
        .undo(&mut session.history)
        .await?;
    session.save_history().await;

    let records = InventoryService::new(state.db).list(None).await?;
    Ok(Json(HistoryResponse {
        message: format!("Undid {}", restored.action),
        status: session.history.status(),
        records,
    }))
}

pub async fn redo(State(state): State<AppState>) -> AppResult<Json<HistoryResponse>> {
    let mut session = state.session.lock().await;
    HistoryService::new(state.db.clone())
        .redo(&mut session.history)
        .await?;
    session.save_history().await;

    let records = InventoryService::new(state.db).list(None).await?;
    Ok(Json(HistoryResponse {
        message: "Redo successful".to_string(),
        status: session.history.status(),
        records,
    }))
}
