//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::str::FromStr;

use chrono::NaiveDate;
use inventory_tracker_backend::{
    config::{Config, DatabaseConfig},
    db, AppState, Session,
};
use rust_decimal::Decimal;
use shared::RecordFields;
use sqlx::SqlitePool;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fresh, migrated in-memory database
pub async fn test_pool() -> SqlitePool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let pool = db::connect(&config).await.unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

pub async fn test_state() -> AppState {
    let config = Config::default();
    let session = Session::new(config.history.max_depth);
    AppState::new(test_pool().await, config, session)
}

pub fn fields(brand: &str, name: &str, product_id: &str, min: i64, current: i64) -> RecordFields {
    RecordFields {
        brand: brand.to_string(),
        product_name: name.to_string(),
        product_id: product_id.to_string(),
        minimum_individual_quantity: min,
        current_amount: current,
        per_package: None,
        per_box: None,
        per_case: None,
        cost: dec("1.00"),
        last_checked: date(2024, 1, 15),
    }
}

/// Acme/Widget/W1, min 5, current 3, $2.00
pub fn widget() -> RecordFields {
    RecordFields {
        cost: dec("2.00"),
        per_box: Some(12),
        ..fields("Acme", "Widget", "W1", 5, 3)
    }
}
