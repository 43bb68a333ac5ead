//! Validation and normalization rules for inventory data
//!
//! Grid cells and imported columns arrive loosely typed. Everything is
//! coerced here once, so the store and the reconciler only ever see
//! normalized values.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

/// Textual form of `last_checked`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound for stock counts, packaging multipliers and order quantities
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Upper bound for a unit cost. With [`MAX_QUANTITY`] this keeps every
/// stock value and total well inside `Decimal` range.
pub const MAX_COST: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

// ============================================================================
// Stock Rules
// ============================================================================

/// Low stock means at or below a positive minimum. A zero minimum disables
/// the check.
pub fn is_low_stock(current_amount: i64, minimum_individual_quantity: i64) -> bool {
    minimum_individual_quantity > 0 && current_amount <= minimum_individual_quantity
}

/// Validate the three required text fields of a record
pub fn validate_required_fields(
    brand: &str,
    product_name: &str,
    product_id: &str,
) -> Result<(), &'static str> {
    if brand.trim().is_empty() {
        return Err("Brand is required");
    }
    if product_name.trim().is_empty() {
        return Err("Product name is required");
    }
    if product_id.trim().is_empty() {
        return Err("Product ID is required");
    }
    Ok(())
}

/// Validate an order quantity
pub fn validate_order_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity must be at most 1000000000");
    }
    Ok(())
}

/// Validate a stock count or packaging multiplier
pub fn validate_count(value: i64) -> Result<(), &'static str> {
    if value > MAX_QUANTITY {
        return Err("Amount must be at most 1000000000");
    }
    Ok(())
}

pub fn validate_cost(cost: Decimal) -> Result<(), &'static str> {
    if cost > MAX_COST {
        return Err("Cost must be at most 1000000000");
    }
    Ok(())
}

// ============================================================================
// Normalization
// ============================================================================

/// Trimmed text, or `None` when absent or blank
pub fn non_blank(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Counts are non-negative
pub fn normalize_count(value: i64) -> i64 {
    value.max(0)
}

/// Packaging multipliers are either strictly positive or absent
pub fn normalize_packaging(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}

/// Quantity cell: absent, negative or non-numeric becomes 0, fractions truncate
pub fn coerce_quantity(value: Option<&Value>) -> i64 {
    value.and_then(integer_value).map(normalize_count).unwrap_or(0)
}

/// Packaging cell: absent unless given as a positive number
pub fn coerce_packaging(value: Option<&Value>) -> Option<i64> {
    normalize_packaging(value.and_then(integer_value))
}

/// Cost cell: absent, negative or non-numeric becomes 0
pub fn coerce_cost(value: Option<&Value>) -> Decimal {
    value
        .and_then(decimal_value)
        .map(|cost| cost.max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO)
}

/// Date cell: absent or unparseable becomes `today`
pub fn coerce_date(value: Option<&Value>, today: NaiveDate) -> NaiveDate {
    match value {
        Some(Value::String(s)) => parse_date(s).unwrap_or(today),
        _ => today,
    }
}

/// Parse a `YYYY-MM-DD` date, tolerating a trailing time component
/// (`2024-03-01T00:00:00`, `2024-03-01 00:00:00`)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(value);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a decimal written as plain text, optionally with a leading `$`
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    let value = value.strip_prefix('$').unwrap_or(value);
    if value.is_empty() {
        return None;
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Parse an integer written as plain text; `"12.0"` is accepted as 12
pub fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_integer(s),
        _ => None,
    }
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}
