//! SQLite adapters
//!
//! Implementations of repository traits using SeaORM and SQLite.

pub mod activity_repo;
pub mod cart_repo;
pub mod category_repo;
pub mod order_repo;
pub mod payment_repo;
pub mod product_repo;
pub mod schema;
pub mod seed;
pub mod testimonial_repo;
pub mod user_repo;


pub use activity_repo::SqliteActivityRepository;
pub use cart_repo::SqliteCartRepository;
pub use category_repo::SqliteCategoryRepository;
pub use order_repo::SqliteOrderRepository;
pub use payment_repo::SqlitePaymentRepository;
pub use product_repo::SqliteProductRepository;
pub use schema::create_schema;
pub use seed::seed_database;
pub use testimonial_repo::SqliteTestimonialRepository;
pub use user_repo::SqliteUserRepository;

use sea_orm::{DbErr, SqlErr};
use serde::de::DeserializeOwned;

use crate::error::DomainError;

/// Translate SeaORM errors, surfacing constraint violations as domain errors
pub(crate) fn db_err(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => DomainError::AlreadyExists(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => DomainError::ForeignKey(msg),
        _ => match e {
            DbErr::RecordNotFound(msg) => DomainError::NotFound(msg),
            DbErr::RecordNotUpdated => DomainError::NotFound("Record not found".to_string()),
            e => DomainError::Database(e.to_string()),
        },
    }
}

/// Decode a JSON column, falling back to the default on malformed data
pub(crate) fn from_json<T: DeserializeOwned + Default>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Malformed JSON column, using default");
        T::default()
    })
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}
