//! Record Store: the inventory table over SQLite
//!
//! The free functions take a `&mut SqliteConnection` so callers can run
//! several of them inside one transaction (reconcile, undo, import).
//! [`InventoryService`] wraps them for single-statement use from handlers.

use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    parse_decimal, validate_cost, validate_count, validate_required_fields, InventoryRecord,
    InventoryStats, RecordFields,
};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const SELECT_COLUMNS: &str = r#"
    SELECT id, brand, product_name, product_id, minimum_individual_quantity,
           current_amount, per_package, per_box, per_case, cost, last_checked,
           created_at, updated_at
    FROM inventory_items
"#;

const ORDER_BY: &str = "ORDER BY brand ASC, product_name ASC, rowid ASC";

/// Record store service
#[derive(Clone)]
pub struct InventoryService {
    db: SqlitePool,
}

/// Raw table row; `cost` is stored as decimal text
#[derive(Debug, FromRow)]
struct InventoryRow {
    id: Uuid,
    brand: String,
    product_name: String,
    product_id: String,
    minimum_individual_quantity: i64,
    current_amount: i64,
    per_package: Option<i64>,
    per_box: Option<i64>,
    per_case: Option<i64>,
    cost: String,
    last_checked: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InventoryRow> for InventoryRecord {
    type Error = AppError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        let cost = parse_decimal(&row.cost).ok_or_else(|| {
            AppError::Internal(format!(
                "Stored cost {:?} for {} is not a decimal",
                row.cost, row.product_id
            ))
        })?;

        Ok(InventoryRecord {
            id: row.id,
            brand: row.brand,
            product_name: row.product_name,
            product_id: row.product_id,
            minimum_individual_quantity: row.minimum_individual_quantity,
            current_amount: row.current_amount,
            per_package: row.per_package,
            per_box: row.per_box,
            per_case: row.per_case,
            cost,
            last_checked: row.last_checked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<InventoryRow>) -> AppResult<Vec<InventoryRecord>> {
    rows.into_iter().map(InventoryRecord::try_from).collect()
}

/// Reject records missing brand, product name or product id, or carrying
/// amounts or a cost beyond the supported range
pub fn validate_fields(fields: &RecordFields) -> AppResult<()> {
    validate_required_fields(&fields.brand, &fields.product_name, &fields.product_id).map_err(
        |message| {
            let field = if fields.brand.trim().is_empty() {
                "brand"
            } else if fields.product_name.trim().is_empty() {
                "product_name"
            } else {
                "product_id"
            };
            invalid(field, message)
        },
    )?;

    let counts = [
        ("minimum_individual_quantity", Some(fields.minimum_individual_quantity)),
        ("current_amount", Some(fields.current_amount)),
        ("per_package", fields.per_package),
        ("per_box", fields.per_box),
        ("per_case", fields.per_case),
    ];
    for (field, value) in counts {
        if let Some(value) = value {
            validate_count(value).map_err(|message| invalid(field, message))?;
        }
    }
    validate_cost(fields.cost).map_err(|message| invalid("cost", message))
}

fn invalid(field: &str, message: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Unicode-aware case-insensitive substring match on the searchable columns
fn matches_filter(record: &InventoryRecord, term: &str) -> bool {
    [&record.brand, &record.product_name, &record.product_id]
        .iter()
        .any(|value| value.to_lowercase().contains(term))
}

// ============================================================================
// Connection-level operations
// ============================================================================

/// Insert a new record and return it with its assigned id
pub async fn insert_record(
    conn: &mut SqliteConnection,
    fields: RecordFields,
    now: DateTime<Utc>,
) -> AppResult<InventoryRecord> {
    let fields = fields.normalized();
    validate_fields(&fields)?;

    if find_by_product_id(&mut *conn, &fields.product_id).await?.is_some() {
        return Err(AppError::DuplicateKey(fields.product_id));
    }

    let record = InventoryRecord::from_fields(Uuid::new_v4(), fields, now);
    write_record(conn, &record).await?;

    tracing::debug!(id = %record.id, product_id = %record.product_id, "Inserted record");
    Ok(record)
}

/// Overwrite every caller-writable field of an existing record
pub async fn update_record(
    conn: &mut SqliteConnection,
    id: Uuid,
    fields: RecordFields,
    now: DateTime<Utc>,
) -> AppResult<InventoryRecord> {
    let fields = fields.normalized();
    validate_fields(&fields)?;

    let existing = fetch_record(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inventory record {}", id)))?;

    if let Some(other) = find_by_product_id(&mut *conn, &fields.product_id).await? {
        if other.id != id {
            return Err(AppError::DuplicateKey(fields.product_id));
        }
    }

    sqlx::query(
        r#"
        UPDATE inventory_items
        SET brand = ?, product_name = ?, product_id = ?, minimum_individual_quantity = ?,
            current_amount = ?, per_package = ?, per_box = ?, per_case = ?, cost = ?,
            last_checked = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.brand)
    .bind(&fields.product_name)
    .bind(&fields.product_id)
    .bind(fields.minimum_individual_quantity)
    .bind(fields.current_amount)
    .bind(fields.per_package)
    .bind(fields.per_box)
    .bind(fields.per_case)
    .bind(fields.cost.to_string())
    .bind(fields.last_checked)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    let mut record = InventoryRecord::from_fields(id, fields, now);
    record.created_at = existing.created_at;
    Ok(record)
}

/// Remove the given ids; unknown ids are ignored
pub async fn delete_records(conn: &mut SqliteConnection, ids: &[Uuid]) -> AppResult<u64> {
    let mut removed = 0;
    for id in ids {
        removed += sqlx::query("DELETE FROM inventory_items WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }
    Ok(removed)
}

/// Records matching `filter` (case-insensitive substring of brand, product
/// name or product id), ordered by brand then product name
pub async fn list_records(
    conn: &mut SqliteConnection,
    filter: Option<&str>,
) -> AppResult<Vec<InventoryRecord>> {
    let sql = format!("{} {}", SELECT_COLUMNS, ORDER_BY);
    let rows = sqlx::query_as::<_, InventoryRow>(&sql)
        .fetch_all(&mut *conn)
        .await?;
    let records = into_records(rows)?;

    // SQLite's lower() only folds ASCII, so matching happens here
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(term) => {
            let term = term.to_lowercase();
            Ok(records
                .into_iter()
                .filter(|record| matches_filter(record, &term))
                .collect())
        }
        None => Ok(records),
    }
}

pub async fn fetch_record(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> AppResult<Option<InventoryRecord>> {
    let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
    sqlx::query_as::<_, InventoryRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(InventoryRecord::try_from)
        .transpose()
}

pub async fn find_by_product_id(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> AppResult<Option<InventoryRecord>> {
    let sql = format!("{} WHERE product_id = ?", SELECT_COLUMNS);
    sqlx::query_as::<_, InventoryRow>(&sql)
        .bind(product_id.trim())
        .fetch_optional(&mut *conn)
        .await?
        .map(InventoryRecord::try_from)
        .transpose()
}

/// Delete everything and write `records` back with their own ids and
/// timestamps. Run inside a transaction.
pub async fn replace_all_records(
    conn: &mut SqliteConnection,
    records: &[InventoryRecord],
) -> AppResult<()> {
    sqlx::query("DELETE FROM inventory_items")
        .execute(&mut *conn)
        .await?;

    for record in records {
        validate_fields(&record.fields())?;
        write_record(&mut *conn, record).await?;
    }
    Ok(())
}

async fn write_record(conn: &mut SqliteConnection, record: &InventoryRecord) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_items (
            id, brand, product_name, product_id, minimum_individual_quantity,
            current_amount, per_package, per_box, per_case, cost, last_checked,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id)
    .bind(&record.brand)
    .bind(&record.product_name)
    .bind(&record.product_id)
    .bind(record.minimum_individual_quantity)
    .bind(record.current_amount)
    .bind(record.per_package)
    .bind(record.per_box)
    .bind(record.per_case)
    .bind(record.cost.to_string())
    .bind(record.last_checked)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// ============================================================================
// Service
// ============================================================================

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a record; fails with `DuplicateKey` when the product id exists
    pub async fn insert(&self, fields: RecordFields) -> AppResult<InventoryRecord> {
        let mut conn = self.db.acquire().await?;
        insert_record(&mut conn, fields, Utc::now()).await
    }

    pub async fn update(&self, id: Uuid, fields: RecordFields) -> AppResult<InventoryRecord> {
        let mut conn = self.db.acquire().await?;
        update_record(&mut conn, id, fields, Utc::now()).await
    }

    /// Idempotent delete; returns how many records were removed
    pub async fn delete(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut tx = self.db.begin().await?;
        let removed = delete_records(&mut tx, ids).await?;
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn list(&self, filter: Option<&str>) -> AppResult<Vec<InventoryRecord>> {
        let mut conn = self.db.acquire().await?;
        list_records(&mut conn, filter).await
    }

    /// Records at or below a positive minimum
    pub async fn low_stock(&self) -> AppResult<Vec<InventoryRecord>> {
        let records = self.list(None).await?;
        Ok(records.into_iter().filter(InventoryRecord::is_low_stock).collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<InventoryRecord> {
        let mut conn = self.db.acquire().await?;
        fetch_record(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inventory record {}", id)))
    }

    pub async fn find_by_product_id(&self, product_id: &str) -> AppResult<InventoryRecord> {
        let mut conn = self.db.acquire().await?;
        find_by_product_id(&mut conn, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id.trim())))
    }

    /// Replace the whole table in one transaction
    pub async fn replace_all(&self, records: &[InventoryRecord]) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        replace_all_records(&mut tx, records).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Quick stats over the whole table
    pub async fn stats(&self) -> AppResult<InventoryStats> {
        let records = self.list(None).await?;
        Ok(InventoryStats::from_records(&records))
    }
}
