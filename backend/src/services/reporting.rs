//! Report documents: CSV export, HTML inventory report, HTML purchase order

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{InventoryRecord, InventoryStats, OrderLine, PurchaseOrder};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::services::inventory::list_records;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: SqlitePool,
}

/// One exported CSV row; header names match what the importer expects
#[derive(Debug, Serialize)]
pub struct InventoryCsvRow<'a> {
    #[serde(rename = "Brand")]
    pub brand: &'a str,
    #[serde(rename = "Product Name")]
    pub product_name: &'a str,
    #[serde(rename = "Product ID")]
    pub product_id: &'a str,
    #[serde(rename = "Min Individual Qty")]
    pub minimum_individual_quantity: i64,
    #[serde(rename = "Current Amount")]
    pub current_amount: i64,
    #[serde(rename = "Per Package")]
    pub per_package: Option<i64>,
    #[serde(rename = "Per Box")]
    pub per_box: Option<i64>,
    #[serde(rename = "Per Case")]
    pub per_case: Option<i64>,
    #[serde(rename = "Cost")]
    pub cost: Decimal,
    #[serde(rename = "Last Checked")]
    pub last_checked: NaiveDate,
}

impl<'a> From<&'a InventoryRecord> for InventoryCsvRow<'a> {
    fn from(record: &'a InventoryRecord) -> Self {
        Self {
            brand: &record.brand,
            product_name: &record.product_name,
            product_id: &record.product_id,
            minimum_individual_quantity: record.minimum_individual_quantity,
            current_amount: record.current_amount,
            per_package: record.per_package,
            per_box: record.per_box,
            per_case: record.per_case,
            cost: record.cost,
            last_checked: record.last_checked,
        }
    }
}

impl ReportingService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Whole inventory as CSV, in list order
    pub async fn inventory_csv(&self) -> AppResult<String> {
        let records = self.all_records().await?;
        if records.is_empty() {
            return Ok(CSV_HEADER.to_string());
        }
        let rows: Vec<InventoryCsvRow<'_>> = records.iter().map(InventoryCsvRow::from).collect();
        Self::export_to_csv(&rows)
    }

    /// Whole inventory as a printable HTML page
    pub async fn inventory_html(&self, generated_at: DateTime<Utc>) -> AppResult<String> {
        let records = self.all_records().await?;
        Ok(render_inventory_report(&records, generated_at))
    }

    async fn all_records(&self) -> AppResult<Vec<InventoryRecord>> {
        let mut conn = self.db.acquire().await?;
        list_records(&mut conn, None).await
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

/// Header row written when the inventory is empty
pub const CSV_HEADER: &str = "Brand,Product Name,Product ID,Min Individual Qty,Current Amount,Per Package,Per Box,Per Case,Cost,Last Checked\n";

// ============================================================================
// HTML rendering
// ============================================================================

const REPORT_STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 40px; color: #333; }
    .header { text-align: center; border-bottom: 2px solid #333; padding-bottom: 20px; margin-bottom: 30px; }
    .summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; margin-bottom: 30px; padding: 20px; background-color: #f8f9fa; border-radius: 8px; }
    .summary-item { text-align: center; }
    .summary-value { font-size: 24px; font-weight: bold; color: #2c3e50; }
    .summary-label { font-size: 14px; color: #666; margin-top: 5px; }
    .order-info { margin-bottom: 30px; padding: 20px; background-color: #f8f9fa; border-radius: 8px; }
    table { width: 100%; border-collapse: collapse; margin-bottom: 30px; }
    th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
    th { background-color: #f5f5f5; font-weight: bold; }
    .out-of-stock { background-color: #f8d7da; }
    .low-stock { background-color: #fff3cd; }
    .good-stock { background-color: #d4edda; }
    .totals { margin-top: 20px; text-align: right; font-weight: bold; font-size: 16px; background-color: #e9ecef; padding: 15px; border-radius: 5px; }
    .footer { margin-top: 50px; border-top: 1px solid #ccc; padding-top: 20px; font-size: 12px; color: #666; }
    @media print { body { margin: 20px; } }
"#;

/// Escape text for an HTML element body or quoted attribute
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn money(value: Decimal) -> String {
    format!("${:.2}", value)
}

fn packaging(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        title, REPORT_STYLE, body
    )
}

/// Inventory report with summary cards and one status-coloured row per record
pub fn render_inventory_report(records: &[InventoryRecord], generated_at: DateTime<Utc>) -> String {
    let stats = InventoryStats::from_records(records);
    let report_date = generated_at.format("%Y-%m-%d %H:%M").to_string();

    let mut body = String::new();
    body.push_str("<div class=\"header\">\n<h1>Inventory Report</h1>\n");
    body.push_str(&format!("<p>Generated on {}</p>\n</div>\n", report_date));

    body.push_str("<div class=\"summary\">\n");
    for (value, label) in [
        (stats.total_items.to_string(), "Total Items"),
        (money(stats.total_value), "Total Value"),
        (stats.low_stock_count.to_string(), "Low Stock Items"),
        (report_date.clone(), "Report Date"),
    ] {
        body.push_str(&format!(
            "<div class=\"summary-item\"><div class=\"summary-value\">{}</div><div class=\"summary-label\">{}</div></div>\n",
            escape_html(&value),
            label
        ));
    }
    body.push_str("</div>\n");

    body.push_str(
        "<table>\n<thead>\n<tr><th>Brand</th><th>Product Name</th><th>Product ID</th>\
         <th>Min Qty</th><th>Current Amount</th><th>Per Package</th><th>Per Box</th>\
         <th>Per Case</th><th>Cost</th><th>Total Value</th><th>Status</th>\
         <th>Last Checked</th></tr>\n</thead>\n<tbody>\n",
    );
    for record in records {
        let status = record.stock_status();
        body.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><strong>{}</strong></td><td>{}</td></tr>\n",
            status.css_class(),
            escape_html(&record.brand),
            escape_html(&record.product_name),
            escape_html(&record.product_id),
            record.minimum_individual_quantity,
            record.current_amount,
            packaging(record.per_package),
            packaging(record.per_box),
            packaging(record.per_case),
            money(record.cost),
            money(record.total_value()),
            status,
            record.last_checked.format("%Y-%m-%d"),
        ));
    }
    body.push_str("</tbody>\n</table>\n");

    body.push_str(&format!(
        "<div class=\"footer\"><p>Generated by Inventory Tracker on {}</p>\
         <p>This report shows the complete inventory status with stock levels and values.</p></div>\n",
        report_date
    ));

    page("Inventory Report", &body)
}

/// Printable purchase order; an empty order has nothing to print
pub fn render_purchase_order(order: &PurchaseOrder, ordered_at: DateTime<Utc>) -> AppResult<String> {
    if order.is_empty() {
        return Err(AppError::ValidationError(
            "The purchase order is empty".to_string(),
        ));
    }

    let order_date = ordered_at.format("%Y-%m-%d %H:%M").to_string();
    let total_items = order.total_items();
    let total_cost = money(order.total_cost());

    let mut body = String::new();
    body.push_str("<div class=\"header\">\n<h1>Purchase Order</h1>\n<p>Inventory Tracker</p>\n</div>\n");
    body.push_str(&format!(
        "<div class=\"order-info\">\n<p><strong>Order Date:</strong> {}</p>\n\
         <p><strong>Total Items Ordered:</strong> {}</p>\n\
         <p><strong>Order Total:</strong> {}</p>\n</div>\n",
        order_date, total_items, total_cost
    ));

    body.push_str(
        "<table>\n<thead>\n<tr><th>Brand</th><th>Product Name</th><th>Product ID</th>\
         <th>Current Stock</th><th>Per Package</th><th>Per Box</th><th>Per Case</th>\
         <th>Quantity to Order</th><th>Unit/Case Cost</th><th>Total Cost</th></tr>\n\
         </thead>\n<tbody>\n",
    );
    for line in order.lines() {
        body.push_str(&order_row(line));
    }
    body.push_str("</tbody>\n</table>\n");

    body.push_str(&format!(
        "<div class=\"totals\"><p>Total Items: {}</p><p>Total Cost: {}</p></div>\n",
        total_items, total_cost
    ));
    body.push_str(&format!(
        "<div class=\"footer\"><p>Generated by Inventory Tracker on {}</p>\
         <p>This purchase order can be printed or saved for your records.</p></div>\n",
        order_date
    ));

    Ok(page("Purchase Order", &body))
}

fn order_row(line: &OrderLine) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape_html(&line.brand),
        escape_html(&line.product_name),
        escape_html(&line.product_id),
        line.current_amount,
        packaging(line.per_package),
        packaging(line.per_box),
        packaging(line.per_case),
        line.quantity,
        money(line.cost),
        money(line.line_total()),
    )
}

/// `inventory_YYYYMMDD.csv`
pub fn csv_filename(at: DateTime<Utc>) -> String {
    format!("inventory_{}.csv", at.format("%Y%m%d"))
}

/// `inventory_report_YYYYMMDD.html`
pub fn report_filename(at: DateTime<Utc>) -> String {
    format!("inventory_report_{}.html", at.format("%Y%m%d"))
}

/// `purchase_order_YYYYMMDD_HHMM.html`
pub fn order_filename(at: DateTime<Utc>) -> String {
    format!("purchase_order_{}.html", at.format("%Y%m%d_%H%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::RecordFields;
    use uuid::Uuid;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-03T14:05:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(product_id: &str, min: i64, current: i64) -> InventoryRecord {
        InventoryRecord::from_fields(
            Uuid::new_v4(),
            RecordFields {
                brand: "Acme & Sons".to_string(),
                product_name: "<Widget>".to_string(),
                product_id: product_id.to_string(),
                minimum_individual_quantity: min,
                current_amount: current,
                per_package: None,
                per_box: Some(12),
                per_case: None,
                cost: Decimal::new(200, 2),
                last_checked: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            },
            at(),
        )
    }

    #[test]
    fn test_filenames() {
        assert_eq!(csv_filename(at()), "inventory_20240603.csv");
        assert_eq!(report_filename(at()), "inventory_report_20240603.html");
        assert_eq!(order_filename(at()), "purchase_order_20240603_1405.html");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }

    #[test]
    fn test_csv_rows_leave_absent_packaging_empty() {
        let records = vec![record("W1", 5, 3)];
        let rows: Vec<InventoryCsvRow<'_>> = records.iter().map(InventoryCsvRow::from).collect();
        let csv = ReportingService::export_to_csv(&rows).unwrap();

        let mut lines = csv.lines();
        assert_eq!(Some(CSV_HEADER.trim_end()), lines.next());
        assert_eq!(
            lines.next(),
            Some("Acme & Sons,<Widget>,W1,5,3,,12,,2.00,2024-06-01")
        );
    }

    #[test]
    fn test_inventory_report_classes_and_escaping() {
        let records = vec![record("OUT", 5, 0), record("LOW", 5, 3), record("OK", 5, 10)];
        let html = render_inventory_report(&records, at());

        assert!(html.contains("class=\"out-of-stock\""));
        assert!(html.contains("class=\"low-stock\""));
        assert!(html.contains("class=\"good-stock\""));
        assert!(html.contains("Acme &amp; Sons"));
        assert!(html.contains("&lt;Widget&gt;"));
        assert!(!html.contains("<Widget>"));
        // 13 units at $2.00
        assert!(html.contains("$26.00"));
        assert!(html.contains("<td>-</td>"));
    }

    #[test]
    fn test_empty_inventory_report_renders() {
        let html = render_inventory_report(&[], at());
        assert!(html.contains("Inventory Report"));
        assert!(html.contains("$0.00"));
    }

    #[test]
    fn test_purchase_order_totals() {
        let mut order = PurchaseOrder::new();
        order.add(&record("W1", 5, 3), 4).unwrap();
        order.add(&record("G1", 1, 1), 1).unwrap();

        let html = render_purchase_order(&order, at()).unwrap();
        assert!(html.contains("<strong>Total Items Ordered:</strong> 5"));
        assert!(html.contains("$10.00"));
        assert!(html.contains("$8.00"));
        assert!(html.contains("2024-06-03 14:05"));
    }

    #[test]
    fn test_empty_purchase_order_rejected() {
        let order = PurchaseOrder::new();
        assert!(matches!(
            render_purchase_order(&order, at()),
            Err(AppError::ValidationError(_))
        ));
    }
}
