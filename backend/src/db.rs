//! SQLite pool setup and migrations

use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Open the connection pool, creating the database file when missing.
///
/// In-memory databases exist per connection, so they get exactly one.
pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| AppError::ConnectionFailure(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true);

    let (max, min) = if is_in_memory(&config.url) {
        (1, 1)
    } else {
        (
            config.max_connections.max(1),
            config.min_connections.min(config.max_connections.max(1)),
        )
    };

    SqlitePoolOptions::new()
        .max_connections(max)
        .min_connections(min)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(|e| AppError::ConnectionFailure(e.to_string()))
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:inv?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://inventory.db"));
    }

    #[tokio::test]
    async fn test_connect_and_migrate_in_memory() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            min_connections: 1,
        };
        let pool = connect(&config).await.unwrap();
        migrate(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
