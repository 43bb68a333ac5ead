//! History snapshot models
//!
//! A snapshot is a full copy of the inventory table. Entries are tagged with
//! their format so rows written by older releases (which recorded fewer
//! columns) can still be replayed. Each legacy shape has its own migration
//! into a full [`InventoryRecord`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::InventoryRecord;
use crate::validation::{
    coerce_cost, coerce_packaging, coerce_quantity, normalize_count, normalize_packaging,
    parse_date,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Unsupported snapshot row with {0} columns")]
    UnsupportedShape(usize),
}

/// Full copy of the inventory at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(alias = "timestamp")]
    pub captured_at: DateTime<Utc>,
    /// Action the snapshot was taken for (`add`, `save`, `import`, ...)
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(alias = "data", deserialize_with = "deserialize_entries")]
    pub entries: Vec<SnapshotEntry>,
}

fn default_action() -> String {
    "save".to_string()
}

impl HistorySnapshot {
    pub fn capture(
        action: impl Into<String>,
        records: Vec<InventoryRecord>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            captured_at,
            action: action.into(),
            entries: records.into_iter().map(SnapshotEntry::Full).collect(),
        }
    }

    /// Migrate every entry into a full record; `now` stamps fields that old
    /// formats never recorded
    pub fn records(&self, now: DateTime<Utc>) -> Vec<InventoryRecord> {
        self.entries
            .iter()
            .cloned()
            .map(|entry| entry.into_record(now))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One row of a snapshot, tagged by format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum SnapshotEntry {
    /// Current format, replayed as-is
    Full(InventoryRecord),
    /// All business columns, no timestamps
    LegacyV11(LegacyV11Row),
    /// No `per_package` column
    LegacyV10(LegacyV10Row),
    /// No packaging columns
    LegacyV8(LegacyV8Row),
    /// No packaging columns and no cost
    LegacyV7(LegacyV7Row),
}

impl SnapshotEntry {
    pub fn into_record(self, now: DateTime<Utc>) -> InventoryRecord {
        match self {
            SnapshotEntry::Full(record) => record,
            SnapshotEntry::LegacyV11(row) => row.migrate(now),
            SnapshotEntry::LegacyV10(row) => row.migrate(now),
            SnapshotEntry::LegacyV8(row) => row.migrate(now),
            SnapshotEntry::LegacyV7(row) => row.migrate(now),
        }
    }

    /// Map an untagged positional row onto its format by column count.
    ///
    /// Column orders:
    /// - 11: brand, name, pid, min, current, per_package, per_box, per_case, cost, last_checked, id
    /// - 10: brand, name, pid, min, current, per_box, per_case, cost, last_checked, id
    /// - 8: brand, name, pid, min, current, cost, last_checked, id
    /// - 7: brand, name, pid, min, current, last_checked, id
    pub fn from_positional(values: &[Value]) -> Result<Self, SnapshotError> {
        let v = values;
        let entry = match v.len() {
            11 => SnapshotEntry::LegacyV11(LegacyV11Row {
                brand: text(&v[0]),
                product_name: text(&v[1]),
                product_id: text(&v[2]),
                minimum_individual_quantity: coerce_quantity(Some(&v[3])),
                current_amount: coerce_quantity(Some(&v[4])),
                per_package: coerce_packaging(Some(&v[5])),
                per_box: coerce_packaging(Some(&v[6])),
                per_case: coerce_packaging(Some(&v[7])),
                cost: coerce_cost(Some(&v[8])),
                last_checked: text(&v[9]),
                item_id: text(&v[10]),
            }),
            10 => SnapshotEntry::LegacyV10(LegacyV10Row {
                brand: text(&v[0]),
                product_name: text(&v[1]),
                product_id: text(&v[2]),
                minimum_individual_quantity: coerce_quantity(Some(&v[3])),
                current_amount: coerce_quantity(Some(&v[4])),
                per_box: coerce_packaging(Some(&v[5])),
                per_case: coerce_packaging(Some(&v[6])),
                cost: coerce_cost(Some(&v[7])),
                last_checked: text(&v[8]),
                item_id: text(&v[9]),
            }),
            8 => SnapshotEntry::LegacyV8(LegacyV8Row {
                brand: text(&v[0]),
                product_name: text(&v[1]),
                product_id: text(&v[2]),
                minimum_individual_quantity: coerce_quantity(Some(&v[3])),
                current_amount: coerce_quantity(Some(&v[4])),
                cost: coerce_cost(Some(&v[5])),
                last_checked: text(&v[6]),
                item_id: text(&v[7]),
            }),
            7 => SnapshotEntry::LegacyV7(LegacyV7Row {
                brand: text(&v[0]),
                product_name: text(&v[1]),
                product_id: text(&v[2]),
                minimum_individual_quantity: coerce_quantity(Some(&v[3])),
                current_amount: coerce_quantity(Some(&v[4])),
                last_checked: text(&v[5]),
                item_id: text(&v[6]),
            }),
            n => return Err(SnapshotError::UnsupportedShape(n)),
        };
        Ok(entry)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyV11Row {
    pub brand: String,
    pub product_name: String,
    pub product_id: String,
    pub minimum_individual_quantity: i64,
    pub current_amount: i64,
    pub per_package: Option<i64>,
    pub per_box: Option<i64>,
    pub per_case: Option<i64>,
    pub cost: Decimal,
    pub last_checked: String,
    pub item_id: String,
}

impl LegacyV11Row {
    fn migrate(self, now: DateTime<Utc>) -> InventoryRecord {
        InventoryRecord {
            id: legacy_id(&self.item_id),
            brand: self.brand,
            product_name: self.product_name,
            product_id: self.product_id,
            minimum_individual_quantity: normalize_count(self.minimum_individual_quantity),
            current_amount: normalize_count(self.current_amount),
            per_package: normalize_packaging(self.per_package),
            per_box: normalize_packaging(self.per_box),
            per_case: normalize_packaging(self.per_case),
            cost: self.cost.max(Decimal::ZERO),
            last_checked: legacy_date(&self.last_checked, now),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyV10Row {
    pub brand: String,
    pub product_name: String,
    pub product_id: String,
    pub minimum_individual_quantity: i64,
    pub current_amount: i64,
    pub per_box: Option<i64>,
    pub per_case: Option<i64>,
    pub cost: Decimal,
    pub last_checked: String,
    pub item_id: String,
}

impl LegacyV10Row {
    fn migrate(self, now: DateTime<Utc>) -> InventoryRecord {
        LegacyV11Row {
            brand: self.brand,
            product_name: self.product_name,
            product_id: self.product_id,
            minimum_individual_quantity: self.minimum_individual_quantity,
            current_amount: self.current_amount,
            per_package: None,
            per_box: self.per_box,
            per_case: self.per_case,
            cost: self.cost,
            last_checked: self.last_checked,
            item_id: self.item_id,
        }
        .migrate(now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyV8Row {
    pub brand: String,
    pub product_name: String,
    pub product_id: String,
    pub minimum_individual_quantity: i64,
    pub current_amount: i64,
    pub cost: Decimal,
    pub last_checked: String,
    pub item_id: String,
}

impl LegacyV8Row {
    fn migrate(self, now: DateTime<Utc>) -> InventoryRecord {
        LegacyV10Row {
            brand: self.brand,
            product_name: self.product_name,
            product_id: self.product_id,
            minimum_individual_quantity: self.minimum_individual_quantity,
            current_amount: self.current_amount,
            per_box: None,
            per_case: None,
            cost: self.cost,
            last_checked: self.last_checked,
            item_id: self.item_id,
        }
        .migrate(now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyV7Row {
    pub brand: String,
    pub product_name: String,
    pub product_id: String,
    pub minimum_individual_quantity: i64,
    pub current_amount: i64,
    pub last_checked: String,
    pub item_id: String,
}

impl LegacyV7Row {
    fn migrate(self, now: DateTime<Utc>) -> InventoryRecord {
        LegacyV8Row {
            brand: self.brand,
            product_name: self.product_name,
            product_id: self.product_id,
            minimum_individual_quantity: self.minimum_individual_quantity,
            current_amount: self.current_amount,
            cost: Decimal::ZERO,
            last_checked: self.last_checked,
            item_id: self.item_id,
        }
        .migrate(now)
    }
}

/// Stored ids that are not UUIDs (e.g. database object ids) get a fresh one
fn legacy_id(item_id: &str) -> Uuid {
    Uuid::parse_str(item_id.trim()).unwrap_or_else(|_| Uuid::new_v4())
}

fn legacy_date(value: &str, now: DateTime<Utc>) -> NaiveDate {
    parse_date(value).unwrap_or_else(|| now.date_naive())
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Tagged(SnapshotEntry),
    Positional(Vec<Value>),
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<SnapshotEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<StoredEntry>::deserialize(deserializer)?
        .into_iter()
        .map(|stored| match stored {
            StoredEntry::Tagged(entry) => Ok(entry),
            StoredEntry::Positional(values) => {
                SnapshotEntry::from_positional(&values).map_err(serde::de::Error::custom)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordFields;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(product_id: &str) -> InventoryRecord {
        InventoryRecord::from_fields(
            Uuid::new_v4(),
            RecordFields {
                brand: "Acme".to_string(),
                product_name: "Widget".to_string(),
                product_id: product_id.to_string(),
                minimum_individual_quantity: 5,
                current_amount: 3,
                per_package: Some(2),
                per_box: Some(12),
                per_case: None,
                cost: Decimal::new(250, 2),
                last_checked: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            },
            now(),
        )
    }

    #[test]
    fn test_full_snapshot_replays_exactly() {
        let records = vec![record("W1"), record("W2")];
        let snapshot = HistorySnapshot::capture("add", records.clone(), now());

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: HistorySnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, snapshot);
        assert_eq!(restored.records(Utc::now()), records);
    }

    #[test]
    fn test_positional_shapes_backfill_missing_columns() {
        let id = Uuid::new_v4();
        let rows = [
            json!(["Acme", "Widget", "W1", 5, 3, 2, 12, null, 2.5, "2024-04-01", id.to_string()]),
            json!(["Acme", "Widget", "W1", 5, 3, 12, 0, 2.5, "2024-04-01", id.to_string()]),
            json!(["Acme", "Widget", "W1", 5, 3, 2.5, "2024-04-01", id.to_string()]),
            json!(["Acme", "Widget", "W1", 5, 3, "2024-04-01", id.to_string()]),
        ];

        let records: Vec<InventoryRecord> = rows
            .iter()
            .map(|row| {
                let values = row.as_array().unwrap();
                SnapshotEntry::from_positional(values).unwrap().into_record(now())
            })
            .collect();

        assert_eq!(records[0].per_package, Some(2));
        assert_eq!(records[0].per_box, Some(12));

        assert_eq!(records[1].per_package, None);
        assert_eq!(records[1].per_box, Some(12));
        assert_eq!(records[1].per_case, None);

        assert_eq!(records[2].per_box, None);
        assert_eq!(records[2].cost, Decimal::new(25, 1));

        assert_eq!(records[3].cost, Decimal::ZERO);
        assert_eq!(records[3].per_package, None);

        for record in &records {
            assert_eq!(record.id, id);
            assert_eq!(record.product_id, "W1");
            assert_eq!(record.last_checked, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
            assert_eq!(record.created_at, now());
        }
    }

    #[test]
    fn test_unsupported_shape_is_rejected() {
        let values = vec![json!("Acme"), json!("Widget")];
        assert_eq!(
            SnapshotEntry::from_positional(&values),
            Err(SnapshotError::UnsupportedShape(2))
        );
    }

    #[test]
    fn test_legacy_document_deserializes() {
        let legacy = json!({
            "timestamp": "2024-01-02T03:04:05Z",
            "action": "current",
            "data": [
                ["Acme", "Widget", "W1", 5, 3, 2.0, "2024-01-01", "64b7f0c2e4b0a1a2b3c4d5e6"],
                {"format": "legacy_v7", "brand": "Acme", "product_name": "Gadget",
                 "product_id": "G1", "minimum_individual_quantity": 0, "current_amount": 9,
                 "last_checked": "not a date", "item_id": ""}
            ]
        });

        let snapshot: HistorySnapshot = serde_json::from_value(legacy).unwrap();
        assert_eq!(snapshot.action, "current");
        assert_eq!(snapshot.len(), 2);

        let records = snapshot.records(now());
        assert_eq!(records[0].cost, Decimal::from(2));
        assert_eq!(records[1].product_id, "G1");
        assert_eq!(records[1].last_checked, now().date_naive());
        assert_ne!(records[0].id, records[1].id);
    }
}
