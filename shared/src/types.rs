//! Common types used across the tracker

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::InventoryRecord;
use crate::validation::is_low_stock;

/// Stock status shown in reports and on the order form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Good,
}

impl StockStatus {
    /// Out of stock wins over low stock; a zero minimum never reports low
    pub fn classify(current_amount: i64, minimum_individual_quantity: i64) -> Self {
        if current_amount == 0 {
            StockStatus::OutOfStock
        } else if is_low_stock(current_amount, minimum_individual_quantity) {
            StockStatus::Low
        } else {
            StockStatus::Good
        }
    }

    /// CSS class used by the HTML report
    pub fn css_class(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "out-of-stock",
            StockStatus::Low => "low-stock",
            StockStatus::Good => "good-stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::OutOfStock => write!(f, "Out of Stock"),
            StockStatus::Low => write!(f, "Low Stock"),
            StockStatus::Good => write!(f, "Good"),
        }
    }
}

/// Quick stats for the whole table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryStats {
    pub total_items: usize,
    pub low_stock_count: usize,
    /// Sum of current amount x cost
    pub total_value: Decimal,
}

impl InventoryStats {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        Self {
            total_items: records.len(),
            low_stock_count: records.iter().filter(|r| r.is_low_stock()).count(),
            total_value: records
                .iter()
                .map(InventoryRecord::total_value)
                .fold(Decimal::ZERO, |total, value| {
                    total.checked_add(value).unwrap_or(Decimal::MAX)
                }),
        }
    }
}
