//! Purchase order operations that need the Record Store

use shared::{OrderLine, PurchaseOrder};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::InventoryService;

/// Adds stocked products to the session's purchase order
#[derive(Clone)]
pub struct OrderService {
    db: SqlitePool,
}

impl OrderService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Look the product up by its business key and add it to `order`
    pub async fn add_product(
        &self,
        order: &mut PurchaseOrder,
        product_id: &str,
        quantity: i64,
    ) -> AppResult<OrderLine> {
        let record = InventoryService::new(self.db.clone())
            .find_by_product_id(product_id)
            .await?;
        let line = order.add(&record, quantity)?.clone();

        tracing::info!(product_id = %line.product_id, quantity = line.quantity, "Order line updated");
        Ok(line)
    }
}
