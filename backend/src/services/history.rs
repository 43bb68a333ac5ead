//! Snapshot capture and undo/redo against the Record Store

use chrono::Utc;
use shared::{HistorySnapshot, HistoryStack};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{list_records, replace_all_records};

/// History service; the stacks themselves live in the session
#[derive(Clone)]
pub struct HistoryService {
    db: SqlitePool,
}

impl HistoryService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Copy the whole table, labelled with the action about to run
    pub async fn capture(&self, action: &str) -> AppResult<HistorySnapshot> {
        let mut conn = self.db.acquire().await?;
        let records = list_records(&mut conn, None).await?;
        Ok(HistorySnapshot::capture(action, records, Utc::now()))
    }

    /// Restore the newest undo snapshot; the replaced state moves to redo
    pub async fn undo(&self, history: &mut HistoryStack) -> AppResult<HistorySnapshot> {
        let target = history.peek_undo().cloned().ok_or(AppError::NothingToUndo)?;
        let current = self.restore(&target, "undo").await?;
        history.undo(current);

        tracing::info!(action = %target.action, records = target.len(), "Undo applied");
        Ok(target)
    }

    /// Restore the newest redo snapshot; the replaced state moves to undo
    pub async fn redo(&self, history: &mut HistoryStack) -> AppResult<HistorySnapshot> {
        let target = history.peek_redo().cloned().ok_or(AppError::NothingToRedo)?;
        let current = self.restore(&target, "redo").await?;
        history.redo(current);

        tracing::info!(records = target.len(), "Redo applied");
        Ok(target)
    }

    /// Replace the table with `target` and return the state it replaced.
    /// The stacks are only touched by the caller once this succeeded.
    async fn restore(&self, target: &HistorySnapshot, action: &str) -> AppResult<HistorySnapshot> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let current = HistorySnapshot::capture(action, list_records(&mut tx, None).await?, now);
        replace_all_records(&mut tx, &target.records(now)).await?;

        tx.commit().await?;
        Ok(current)
    }
}
