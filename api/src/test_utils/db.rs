//! In-memory SQLite database for adapter and end-to-end tests

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::adapters::sqlite::create_schema;

/// Fresh in-memory database with the schema applied.
///
/// The pool is pinned to a single connection: every SQLite `:memory:`
/// connection is its own database.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    create_schema(&db).await.expect("Failed to create schema");
    db
}
