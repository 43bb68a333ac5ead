//! WebAssembly module for the Inventory Tracker
//!
//! Lets the browser grid apply the same rules as the server before saving:
//! - Stock status classification
//! - Cell normalization
//! - Order line totals
//! - Bulk save previews

use rust_decimal::Decimal;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use shared::{
    coerce_packaging, parse_date, parse_decimal, plan_changes, EditedRow, InventoryRecord,
    StockStatus,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("Inventory Tracker rules loaded"));
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

/// Stock status label ("Out of Stock", "Low Stock", "Good")
#[wasm_bindgen]
pub fn stock_status(current_amount: i32, minimum_individual_quantity: i32) -> String {
    StockStatus::classify(current_amount.into(), minimum_individual_quantity.into()).to_string()
}

/// CSS class for a grid row
#[wasm_bindgen]
pub fn stock_css_class(current_amount: i32, minimum_individual_quantity: i32) -> String {
    StockStatus::classify(current_amount.into(), minimum_individual_quantity.into())
        .css_class()
        .to_string()
}

/// Packaging multiplier as stored: blank, zero or negative cells become
/// `undefined`
#[wasm_bindgen]
pub fn normalize_packaging_cell(cell: &str) -> Option<u32> {
    let value = Value::String(cell.to_string());
    coerce_packaging(Some(&value)).and_then(|v| u32::try_from(v).ok())
}

/// Normalize one grid row (JSON) the way a save would; returns `null` for
/// rows missing brand, product name or product id
#[wasm_bindgen]
pub fn normalize_row(row_json: &str, today: &str) -> Result<String, JsValue> {
    let row: EditedRow =
        serde_json::from_str(row_json).map_err(|e| js_error("Invalid row JSON", e))?;
    let today = parse_date(today).ok_or_else(|| JsValue::from_str("Invalid date"))?;

    serde_json::to_string(&row.normalize(today)).map_err(|e| js_error("Serialization error", e))
}

/// Quantity x unit cost, formatted with two decimals
#[wasm_bindgen]
pub fn order_line_total(quantity: i32, cost: &str) -> Result<String, JsValue> {
    let cost = parse_decimal(cost).ok_or_else(|| JsValue::from_str("Invalid cost"))?;
    let total = Decimal::from(quantity)
        .checked_mul(cost)
        .ok_or_else(|| JsValue::from_str("Line total out of range"))?;
    Ok(format!("{:.2}", total))
}

/// Message a bulk save would report, e.g. "Added 1 new item(s)"
#[wasm_bindgen]
pub fn preview_save(last_known_json: &str, edited_json: &str, today: &str) -> Result<String, JsValue> {
    let last_known: Vec<InventoryRecord> = serde_json::from_str(last_known_json)
        .map_err(|e| js_error("Invalid records JSON", e))?;
    let edited: Vec<EditedRow> =
        serde_json::from_str(edited_json).map_err(|e| js_error("Invalid rows JSON", e))?;
    let today = parse_date(today).ok_or_else(|| JsValue::from_str("Invalid date"))?;

    Ok(plan_changes(&last_known, &edited, today).summary().message())
}
