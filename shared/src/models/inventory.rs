//! Inventory record models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::StockStatus;
use crate::validation::{
    coerce_cost, coerce_date, coerce_packaging, coerce_quantity, is_low_stock, non_blank,
    normalize_count, normalize_packaging,
};

/// A stock-keeping unit as held by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub brand: String,
    pub product_name: String,
    /// Business key, unique among live records
    pub product_id: String,
    pub minimum_individual_quantity: i64,
    pub current_amount: i64,
    pub per_package: Option<i64>,
    pub per_box: Option<i64>,
    pub per_case: Option<i64>,
    pub cost: Decimal,
    pub last_checked: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Build a fresh record from caller-supplied fields
    pub fn from_fields(id: Uuid, fields: RecordFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            brand: fields.brand,
            product_name: fields.product_name,
            product_id: fields.product_id,
            minimum_individual_quantity: fields.minimum_individual_quantity,
            current_amount: fields.current_amount,
            per_package: fields.per_package,
            per_box: fields.per_box,
            per_case: fields.per_case,
            cost: fields.cost,
            last_checked: fields.last_checked,
            created_at: now,
            updated_at: now,
        }
    }

    /// The caller-writable part of the record
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            brand: self.brand.clone(),
            product_name: self.product_name.clone(),
            product_id: self.product_id.clone(),
            minimum_individual_quantity: self.minimum_individual_quantity,
            current_amount: self.current_amount,
            per_package: self.per_package,
            per_box: self.per_box,
            per_case: self.per_case,
            cost: self.cost,
            last_checked: self.last_checked,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.current_amount, self.minimum_individual_quantity)
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.current_amount, self.minimum_individual_quantity)
    }

    /// Value of the stock on hand (current amount x unit cost)
    pub fn total_value(&self) -> Decimal {
        Decimal::from(self.current_amount)
            .checked_mul(self.cost)
            .unwrap_or(Decimal::MAX)
    }
}

/// Every field a caller may write; equality is the field-by-field
/// comparison used when reconciling grid edits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub brand: String,
    pub product_name: String,
    pub product_id: String,
    pub minimum_individual_quantity: i64,
    pub current_amount: i64,
    pub per_package: Option<i64>,
    pub per_box: Option<i64>,
    pub per_case: Option<i64>,
    pub cost: Decimal,
    pub last_checked: NaiveDate,
}

impl RecordFields {
    /// Trim text, clamp counts at zero and collapse non-positive packaging
    /// multipliers to `None`
    pub fn normalized(self) -> Self {
        Self {
            brand: self.brand.trim().to_string(),
            product_name: self.product_name.trim().to_string(),
            product_id: self.product_id.trim().to_string(),
            minimum_individual_quantity: normalize_count(self.minimum_individual_quantity),
            current_amount: normalize_count(self.current_amount),
            per_package: normalize_packaging(self.per_package),
            per_box: normalize_packaging(self.per_box),
            per_case: normalize_packaging(self.per_case),
            cost: self.cost.max(Decimal::ZERO),
            last_checked: self.last_checked,
        }
    }
}

/// One row of the editable grid as submitted by the browser.
///
/// Numeric and date cells arrive loosely typed (numbers, numeric strings,
/// null or garbage) and are coerced by [`EditedRow::normalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditedRow {
    /// Ignored for matching; rows are matched by `product_id`
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub minimum_individual_quantity: Option<Value>,
    #[serde(default)]
    pub current_amount: Option<Value>,
    #[serde(default)]
    pub per_package: Option<Value>,
    #[serde(default)]
    pub per_box: Option<Value>,
    #[serde(default)]
    pub per_case: Option<Value>,
    #[serde(default)]
    pub cost: Option<Value>,
    #[serde(default)]
    pub last_checked: Option<Value>,
}

impl EditedRow {
    /// Coerce the row into record fields.
    ///
    /// Returns `None` for scratch rows missing brand, product name or
    /// product id.
    pub fn normalize(&self, today: NaiveDate) -> Option<RecordFields> {
        let brand = non_blank(self.brand.as_deref())?;
        let product_name = non_blank(self.product_name.as_deref())?;
        let product_id = non_blank(self.product_id.as_deref())?;

        Some(RecordFields {
            brand,
            product_name,
            product_id,
            minimum_individual_quantity: coerce_quantity(self.minimum_individual_quantity.as_ref()),
            current_amount: coerce_quantity(self.current_amount.as_ref()),
            per_package: coerce_packaging(self.per_package.as_ref()),
            per_box: coerce_packaging(self.per_box.as_ref()),
            per_case: coerce_packaging(self.per_case.as_ref()),
            cost: coerce_cost(self.cost.as_ref()),
            last_checked: coerce_date(self.last_checked.as_ref(), today),
        })
    }
}

impl From<&InventoryRecord> for EditedRow {
    fn from(record: &InventoryRecord) -> Self {
        Self {
            id: Some(record.id),
            brand: Some(record.brand.clone()),
            product_name: Some(record.product_name.clone()),
            product_id: Some(record.product_id.clone()),
            minimum_individual_quantity: Some(record.minimum_individual_quantity.into()),
            current_amount: Some(record.current_amount.into()),
            per_package: record.per_package.map(Value::from),
            per_box: record.per_box.map(Value::from),
            per_case: record.per_case.map(Value::from),
            cost: Some(Value::String(record.cost.to_string())),
            last_checked: Some(Value::String(crate::validation::format_date(
                record.last_checked,
            ))),
        }
    }
}
