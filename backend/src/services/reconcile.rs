//! Applies grid edits to the Record Store

use chrono::Utc;
use shared::{plan_changes, ChangeSummary, EditedRow};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::inventory::{delete_records, insert_record, list_records, update_record};

/// Reconciliation service for bulk saves
#[derive(Clone)]
pub struct ReconcileService {
    db: SqlitePool,
}

impl ReconcileService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Reconcile `rows` against the records the grid was showing for
    /// `filter` and apply the resulting plan in one transaction.
    ///
    /// Any failure (e.g. a duplicate product id) rolls back the whole save.
    pub async fn apply(&self, filter: Option<&str>, rows: &[EditedRow]) -> AppResult<ChangeSummary> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let last_known = list_records(&mut tx, filter).await?;
        let plan = plan_changes(&last_known, rows, now.date_naive());
        let summary = plan.summary();

        if plan.is_empty() {
            tracing::debug!("Bulk save found no changes");
            return Ok(summary);
        }

        for update in plan.updates {
            update_record(&mut tx, update.id, update.fields, now).await?;
        }
        for fields in plan.inserts {
            insert_record(&mut tx, fields, now).await?;
        }
        delete_records(&mut tx, &plan.deletes).await?;

        tx.commit().await?;

        tracing::info!(
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            "Applied bulk save"
        );
        Ok(summary)
    }
}
