//! Purchase order models
//!
//! An order lives only for the operator's session and is never persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::InventoryRecord;
use crate::validation::validate_order_quantity;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Quantity must be between 1 and 1000000000")]
    InvalidQuantity,

    #[error("Product {0} is not on the order")]
    NotOnOrder(String),
}

/// One product on a purchase order.
///
/// Display fields are copied from the record when the line is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub brand: String,
    pub product_name: String,
    pub current_amount: i64,
    pub per_package: Option<i64>,
    pub per_box: Option<i64>,
    pub per_case: Option<i64>,
    pub cost: Decimal,
    pub quantity: i64,
}

impl OrderLine {
    pub fn from_record(record: &InventoryRecord, quantity: i64) -> Self {
        Self {
            product_id: record.product_id.clone(),
            brand: record.brand.clone(),
            product_name: record.product_name.clone(),
            current_amount: record.current_amount,
            per_package: record.per_package,
            per_box: record.per_box,
            per_case: record.per_case,
            cost: record.cost,
            quantity,
        }
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity)
            .checked_mul(self.cost)
            .unwrap_or(Decimal::MAX)
    }
}

/// Ad-hoc purchase order with at most one line per product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    lines: Vec<OrderLine>,
}

impl PurchaseOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product, or increase its quantity when it is already ordered
    pub fn add(&mut self, record: &InventoryRecord, quantity: i64) -> Result<&OrderLine, OrderError> {
        validate_order_quantity(quantity).map_err(|_| OrderError::InvalidQuantity)?;

        let index = match self
            .lines
            .iter()
            .position(|line| line.product_id == record.product_id)
        {
            Some(index) => {
                let merged = self.lines[index]
                    .quantity
                    .checked_add(quantity)
                    .filter(|merged| validate_order_quantity(*merged).is_ok())
                    .ok_or(OrderError::InvalidQuantity)?;
                self.lines[index].quantity = merged;
                index
            }
            None => {
                self.lines.push(OrderLine::from_record(record, quantity));
                self.lines.len() - 1
            }
        };

        Ok(&self.lines[index])
    }

    /// Remove a product; returns whether it was on the order
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), OrderError> {
        validate_order_quantity(quantity).map_err(|_| OrderError::InvalidQuantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or_else(|| OrderError::NotOnOrder(product_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of ordered quantities
    pub fn total_items(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |total, line| total.saturating_add(line.quantity))
    }

    pub fn total_cost(&self) -> Decimal {
        self.lines
            .iter()
            .map(OrderLine::line_total)
            .fold(Decimal::ZERO, |total, value| {
                total.checked_add(value).unwrap_or(Decimal::MAX)
            })
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            lines: self.lines.clone(),
            total_items: self.total_items(),
            total_cost: self.total_cost(),
        }
    }
}

/// Order view returned to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub total_items: i64,
    pub total_cost: Decimal,
}
