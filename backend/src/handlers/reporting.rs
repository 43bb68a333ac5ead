//! Report download and CSV import handlers

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::services::reporting::{csv_filename, report_filename};
use crate::services::{HistoryService, ImportService, ReportingService};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub message: String,
}

fn attachment(content_type: &str, filename: String) -> [(header::HeaderName, String); 2] {
    [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ]
}

/// Inventory CSV download
pub async fn export_inventory_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db);
    let csv = service.inventory_csv().await?;
    Ok((attachment("text/csv", csv_filename(Utc::now())), csv))
}

/// Inventory HTML report download
pub async fn export_inventory_html(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let service = ReportingService::new(state.db);
    let html = service.inventory_html(now).await?;
    Ok((
        attachment("text/html; charset=utf-8", report_filename(now)),
        html,
    ))
}

/// Replace the inventory with an uploaded CSV (multipart field `file`)
pub async fn import_inventory(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ImportResponse>> {
    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Format(format!("Malformed upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Format(format!("Malformed upload: {}", e)))?;
            data = Some(bytes);
            break;
        }
    }
    let data = data.ok_or_else(|| AppError::Validation {
        field: "file".to_string(),
        message: "No CSV file uploaded".to_string(),
    })?;

    let mut session = state.session.lock().await;
    let snapshot = HistoryService::new(state.db.clone()).capture("import").await?;
    let imported = ImportService::new(state.db).import_csv(&data).await?;
    session.record(snapshot).await;

    Ok(Json(ImportResponse {
        imported,
        message: format!("Imported {} item(s)", imported),
    }))
}
