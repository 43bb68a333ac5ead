//! HTTP API tests
//!
//! Drives the full router with `oneshot` requests:
//! - Add / bulk save / undo / redo flow through the session
//! - Error mapping to status codes
//! - Purchase order and downloads

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::*;
use inventory_tracker_backend::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn widget_json() -> Value {
    json!({
        "brand": "Acme",
        "product_name": "Widget",
        "product_id": "W1",
        "minimum_individual_quantity": 5,
        "current_amount": 3,
        "per_box": 12,
        "cost": "2.00",
        "last_checked": "2024-01-15"
    })
}

async fn app() -> (Router, AppState) {
    let state = test_state().await;
    (create_app(state.clone()), state)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, body) = send_json(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

// ============================================================================
// Inventory
// ============================================================================

#[tokio::test]
async fn test_add_list_and_low_stock() {
    let (app, _) = app().await;

    let (status, created) = send_json(&app, Method::POST, "/api/v1/inventory", Some(widget_json())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["product_id"], "W1");

    let (_, list) = send_json(&app, Method::GET, "/api/v1/inventory?search=acm", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, low) = send_json(&app, Method::GET, "/api/v1/inventory/low-stock", None).await;
    assert_eq!(low.as_array().unwrap().len(), 1);

    let (_, stats) = send_json(&app, Method::GET, "/api/v1/inventory/stats", None).await;
    assert_eq!(stats["total_items"], 1);
    assert_eq!(stats["low_stock_count"], 1);

    let id = created["id"].as_str().unwrap();
    let (status, one) = send_json(&app, Method::GET, &format!("/api/v1/inventory/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["brand"], "Acme");
}

#[tokio::test]
async fn test_duplicate_add_is_conflict_and_not_recorded() {
    let (app, state) = app().await;
    send_json(&app, Method::POST, "/api/v1/inventory", Some(widget_json())).await;

    let (status, body) = send_json(&app, Method::POST, "/api/v1/inventory", Some(widget_json())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_KEY");

    assert_eq!(state.session.lock().await.history.undo_depth(), 1);
}

#[tokio::test]
async fn test_add_without_brand_is_bad_request() {
    let (app, _) = app().await;
    let mut input = widget_json();
    input["brand"] = json!("");

    let (status, body) = send_json(&app, Method::POST, "/api/v1/inventory", Some(input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "brand");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (app, _) = app().await;
    let uri = format!("/api/v1/inventory/{}", uuid::Uuid::new_v4());
    let (status, _) = send_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_save_then_undo_and_redo() {
    let (app, _) = app().await;
    send_json(&app, Method::POST, "/api/v1/inventory", Some(widget_json())).await;

    let mut edited = widget_json();
    edited["current_amount"] = json!("10");
    let rows = json!({
        "rows": [
            edited,
            {"brand": "Acme", "product_name": "Gadget", "product_id": "G1", "current_amount": 4}
        ]
    });
    let (status, saved) = send_json(&app, Method::PUT, "/api/v1/inventory", Some(rows)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["message"], "Added 1 new item(s) and Updated 1 existing item(s)");
    assert_eq!(saved["records"].as_array().unwrap().len(), 2);

    let (_, history) = send_json(&app, Method::GET, "/api/v1/history", None).await;
    assert_eq!(history["undo_depth"], 2);
    assert_eq!(history["last_action"], "save");

    let (status, undone) = send_json(&app, Method::POST, "/api/v1/history/undo", None).await;
    assert_eq!(status, StatusCode::OK);
    let records = undone["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["current_amount"], 3);
    assert_eq!(undone["status"]["can_redo"], true);

    let (status, redone) = send_json(&app, Method::POST, "/api/v1/history/redo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(redone["records"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_no_change_save_records_nothing() {
    let (app, state) = app().await;
    send_json(&app, Method::POST, "/api/v1/inventory", Some(widget_json())).await;

    let rows = json!({ "rows": [widget_json()] });
    let (status, saved) = send_json(&app, Method::PUT, "/api/v1/inventory", Some(rows)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["message"], "No changes detected");
    assert_eq!(state.session.lock().await.history.undo_depth(), 1);
}

#[tokio::test]
async fn test_undo_with_empty_history_is_conflict() {
    let (app, _) = app().await;
    let (status, body) = send_json(&app, Method::POST, "/api/v1/history/undo", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NOTHING_TO_UNDO");
}

// ============================================================================
// Purchase Order
// ============================================================================

#[tokio::test]
async fn test_order_flow() {
    let (app, _) = app().await;
    send_json(&app, Method::POST, "/api/v1/inventory", Some(widget_json())).await;

    let (status, _) = send(&app, Method::GET, "/api/v1/order/export", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let line = json!({"product_id": "W1", "quantity": 2});
    let (status, _) = send_json(&app, Method::POST, "/api/v1/order/lines", Some(line.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, merged) = send_json(&app, Method::POST, "/api/v1/order/lines", Some(line)).await;
    assert_eq!(merged["quantity"], 4);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1/order/lines",
        Some(json!({"product_id": "W1", "quantity": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1/order/lines",
        Some(json!({"product_id": "NOPE", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, order) = send_json(
        &app,
        Method::PUT,
        "/api/v1/order/lines/W1",
        Some(json!({"quantity": 5})),
    )
    .await;
    assert_eq!(order["total_items"], 5);
    assert_eq!(order["total_cost"], "10.00");

    let (status, html) = send(&app, Method::GET, "/api/v1/order/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(html).unwrap().contains("Purchase Order"));

    let (status, _) = send_json(&app, Method::DELETE, "/api/v1/order/lines/W1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, Method::DELETE, "/api/v1/order/lines/W1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send_json(&app, Method::POST, "/api/v1/order/lines", Some(json!({"product_id": "W1", "quantity": 1}))).await;
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1/order/lines",
        Some(json!({"product_id": "W1", "quantity": i64::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "quantity");

    let (_, cleared) = send_json(&app, Method::DELETE, "/api/v1/order", None).await;
    assert_eq!(cleared["lines"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_downloads_carry_filenames() {
    let (app, _) = app().await;
    send_json(&app, Method::POST, "/api/v1/inventory", Some(widget_json())).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/reports/inventory.csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"inventory_"));
    assert!(disposition.ends_with(".csv\""));

    let (status, html) = send(&app, Method::GET, "/api/v1/reports/inventory.html", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(html).unwrap().contains("W1"));
}

#[tokio::test]
async fn test_multipart_import_records_history() {
    let (app, state) = app().await;

    let csv = "Brand,Product Name,Product ID,Min Individual Qty,Current Amount,Cost,Last Checked\n\
               Acme,Widget,W1,5,3,2.00,2024-01-15\n\
               Acme,Gadget,G1,0,4,1.00,2024-01-15\n";
    let boundary = "X-INVENTORY-BOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"inventory.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = boundary,
        csv = csv
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/reports/import")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, list) = send_json(&app, Method::GET, "/api/v1/inventory", None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(state.session.lock().await.history.status().last_action.as_deref(), Some("import"));
}
