//! Reconciliation of grid edits against the last-known table
//!
//! Rows are matched by business key (`product_id`), never by the store's
//! internal id. The planner is pure; the backend applies the plan.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{EditedRow, InventoryRecord, RecordFields};

/// Store writes needed to reach the edited state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangePlan {
    pub inserts: Vec<RecordFields>,
    pub updates: Vec<PlannedUpdate>,
    pub deletes: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    pub id: Uuid,
    pub fields: RecordFields,
}

impl ChangePlan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            inserted: self.inserts.len(),
            updated: self.updates.len(),
            deleted: self.deletes.len(),
        }
    }
}

/// Counts reported back to the operator after a bulk save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }

    /// e.g. "Added 1 new item(s) and Updated 2 existing item(s)"
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if self.inserted > 0 {
            parts.push(format!("Added {} new item(s)", self.inserted));
        }
        if self.updated > 0 {
            parts.push(format!("Updated {} existing item(s)", self.updated));
        }
        if self.deleted > 0 {
            parts.push(format!("Deleted {} item(s)", self.deleted));
        }
        if parts.is_empty() {
            "No changes detected".to_string()
        } else {
            parts.join(" and ")
        }
    }
}

/// Compute inserts, updates and deletes turning `last_known` into `edited`.
///
/// Each edited row claims the first unclaimed last-known record with the
/// same trimmed `product_id`. Claimed records are updated only when a
/// normalized field differs; unclaimed records are deleted. Rows missing
/// brand, product name or product id are skipped.
pub fn plan_changes(
    last_known: &[InventoryRecord],
    edited: &[EditedRow],
    today: NaiveDate,
) -> ChangePlan {
    let mut processed: HashSet<Uuid> = HashSet::with_capacity(last_known.len());
    let mut plan = ChangePlan::default();

    for fields in edited.iter().filter_map(|row| row.normalize(today)) {
        let matched = last_known.iter().find(|record| {
            !processed.contains(&record.id) && record.product_id.trim() == fields.product_id
        });

        match matched {
            Some(record) => {
                processed.insert(record.id);
                if record.fields().normalized() != fields {
                    plan.updates.push(PlannedUpdate {
                        id: record.id,
                        fields,
                    });
                }
            }
            None => plan.inserts.push(fields),
        }
    }

    plan.deletes = last_known
        .iter()
        .filter(|record| !processed.contains(&record.id))
        .map(|record| record.id)
        .collect();

    plan
}
