//! CSV import: parse and validate the whole file, then replace the table

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    normalize_packaging, parse_date, parse_decimal, parse_integer, InventoryRecord, RecordFields,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{replace_all_records, validate_fields};

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Brand",
    "Product Name",
    "Product ID",
    "Min Individual Qty",
    "Current Amount",
    "Cost",
    "Last Checked",
];

pub const OPTIONAL_COLUMNS: [&str; 3] = ["Per Package", "Per Box", "Per Case"];

/// CSV import service
#[derive(Clone)]
pub struct ImportService {
    db: SqlitePool,
}

impl ImportService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Replace the inventory with the contents of `data`.
    ///
    /// Nothing is written unless every row parses.
    pub async fn import_csv(&self, data: &[u8]) -> AppResult<usize> {
        let now = Utc::now();
        let rows = parse_csv(data, now.date_naive())?;

        let records: Vec<InventoryRecord> = rows
            .into_iter()
            .map(|fields| InventoryRecord::from_fields(Uuid::new_v4(), fields, now))
            .collect();

        let mut tx = self.db.begin().await?;
        replace_all_records(&mut tx, &records).await?;
        tx.commit().await?;

        tracing::info!(records = records.len(), "Imported inventory from CSV");
        Ok(records.len())
    }
}

/// Column positions resolved from the header row
struct Columns {
    index: HashMap<&'static str, usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> AppResult<Self> {
        let mut index = HashMap::new();
        for name in REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS.iter()) {
            if let Some(pos) = headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == *name)
            {
                index.insert(*name, pos);
            }
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !index.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Format(format!(
                "CSV must contain columns: {} (missing: {})",
                REQUIRED_COLUMNS.join(", "),
                missing.join(", ")
            )));
        }

        Ok(Self { index })
    }

    fn cell<'r>(&self, record: &'r csv::StringRecord, name: &str) -> &'r str {
        self.index
            .get(name)
            .and_then(|pos| record.get(*pos))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Parse an inventory CSV into validated record fields
pub fn parse_csv(data: &[u8], today: NaiveDate) -> AppResult<Vec<RecordFields>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Format(format!("Unreadable CSV header: {}", e)))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for (i, result) in reader.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let record = result.map_err(|e| AppError::Format(format!("Line {}: {}", line, e)))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let fields = parse_row(&columns, &record, today).map_err(|(field, message)| {
            AppError::Validation {
                field: field.to_string(),
                message: format!("Line {}: {}", line, message),
            }
        })?;

        if !seen.insert(fields.product_id.clone()) {
            return Err(AppError::Validation {
                field: "product_id".to_string(),
                message: format!("Line {}: duplicate Product ID {}", line, fields.product_id),
            });
        }
        rows.push(fields);
    }

    Ok(rows)
}

type RowError = (&'static str, String);

fn parse_row(
    columns: &Columns,
    record: &csv::StringRecord,
    today: NaiveDate,
) -> Result<RecordFields, RowError> {
    let fields = RecordFields {
        brand: columns.cell(record, "Brand").to_string(),
        product_name: columns.cell(record, "Product Name").to_string(),
        product_id: columns.cell(record, "Product ID").to_string(),
        minimum_individual_quantity: quantity(columns, record, "Min Individual Qty")?,
        current_amount: quantity(columns, record, "Current Amount")?,
        per_package: packaging(columns, record, "Per Package")?,
        per_box: packaging(columns, record, "Per Box")?,
        per_case: packaging(columns, record, "Per Case")?,
        cost: cost(columns, record)?,
        last_checked: date(columns, record, today)?,
    };

    validate_fields(&fields).map_err(|err| match err {
        AppError::Validation { message, .. } => ("record", message),
        other => ("record", other.to_string()),
    })?;

    Ok(fields.normalized())
}

fn quantity(columns: &Columns, record: &csv::StringRecord, name: &str) -> Result<i64, RowError> {
    let cell = columns.cell(record, name);
    if cell.is_empty() {
        return Ok(0);
    }
    parse_integer(cell)
        .ok_or_else(|| ("quantity", format!("{} {:?} is not a number", name, cell)))
}

fn packaging(
    columns: &Columns,
    record: &csv::StringRecord,
    name: &str,
) -> Result<Option<i64>, RowError> {
    let cell = columns.cell(record, name);
    if cell.is_empty() {
        return Ok(None);
    }
    parse_integer(cell)
        .map(|value| normalize_packaging(Some(value)))
        .ok_or_else(|| ("packaging", format!("{} {:?} is not a number", name, cell)))
}

fn cost(columns: &Columns, record: &csv::StringRecord) -> Result<Decimal, RowError> {
    let cell = columns.cell(record, "Cost");
    if cell.is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_decimal(cell).ok_or_else(|| ("cost", format!("Cost {:?} is not a number", cell)))
}

fn date(
    columns: &Columns,
    record: &csv::StringRecord,
    today: NaiveDate,
) -> Result<NaiveDate, RowError> {
    let cell = columns.cell(record, "Last Checked");
    if cell.is_empty() {
        return Ok(today);
    }
    parse_date(cell).ok_or_else(|| {
        (
            "last_checked",
            format!("Last Checked {:?} is not a YYYY-MM-DD date", cell),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    const HEADER: &str = "Brand,Product Name,Product ID,Min Individual Qty,Current Amount,Per Package,Per Box,Per Case,Cost,Last Checked\n";

    #[test]
    fn test_parse_full_row() {
        let data = format!("{}Acme,Widget,W1,5,3,,12,0,2.50,2024-04-30\n", HEADER);
        let rows = parse_csv(data.as_bytes(), today()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.product_id, "W1");
        assert_eq!(row.minimum_individual_quantity, 5);
        assert_eq!(row.per_package, None);
        assert_eq!(row.per_box, Some(12));
        assert_eq!(row.per_case, None);
        assert_eq!(row.cost, Decimal::new(250, 2));
        assert_eq!(row.last_checked, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let data = "Brand,Product Name,Product ID,Min Individual Qty,Current Amount,Cost,Last Checked\n\
                    Acme,Widget,W1,5,3,2.00,\n";
        let rows = parse_csv(data.as_bytes(), today()).unwrap();
        assert_eq!(rows[0].per_box, None);
        assert_eq!(rows[0].last_checked, today());
    }

    #[test]
    fn test_missing_required_column_is_format_error() {
        let data = "Brand,Product Name,Product ID,Current Amount,Cost,Last Checked\n";
        let err = parse_csv(data.as_bytes(), today()).unwrap_err();
        match err {
            AppError::Format(message) => assert!(message.contains("Min Individual Qty")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_quantity_names_line() {
        let data = format!(
            "{}Acme,Widget,W1,5,3,,,,2.00,2024-04-30\nAcme,Gadget,G1,x,3,,,,1.00,2024-04-30\n",
            HEADER
        );
        let err = parse_csv(data.as_bytes(), today()).unwrap_err();
        match err {
            AppError::Validation { message, .. } => assert!(message.starts_with("Line 3")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_with_byte_order_mark() {
        let data = format!("\u{feff}{}Acme,Widget,W1,5,3,,12,,2.00,2024-04-30\n", HEADER);
        let rows = parse_csv(data.as_bytes(), today()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].brand, "Acme");
    }

    #[test]
    fn test_out_of_range_amount_names_line() {
        let data = format!(
            "{}Acme,Widget,W1,5,9223372036854775807,,,,10000000000,2024-04-30\n",
            HEADER
        );
        match parse_csv(data.as_bytes(), today()).unwrap_err() {
            AppError::Validation { message, .. } => assert!(message.starts_with("Line 2")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_key_field_rejected() {
        let data = format!("{}Acme,,W1,5,3,,,,2.00,2024-04-30\n", HEADER);
        assert!(matches!(
            parse_csv(data.as_bytes(), today()),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_duplicate_product_id_rejected() {
        let data = format!(
            "{}Acme,Widget,W1,5,3,,,,2.00,2024-04-30\nAcme,Other,W1,1,1,,,,1.00,2024-04-30\n",
            HEADER
        );
        assert!(matches!(
            parse_csv(data.as_bytes(), today()),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_bad_date_rejected() {
        let data = format!("{}Acme,Widget,W1,5,3,,,,2.00,yesterday\n", HEADER);
        assert!(parse_csv(data.as_bytes(), today()).is_err());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let data = format!("{}Acme,Widget,W1,5,3,,,,2.00,2024-04-30\n,,,,,,,,,\n", HEADER);
        assert_eq!(parse_csv(data.as_bytes(), today()).unwrap().len(), 1);
    }
}
