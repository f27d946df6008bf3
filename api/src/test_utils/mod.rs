//! Test utilities
//!
//! In-memory port implementations, payment gateway mocks and fixtures for
//! service unit tests.
//!
//! Repository adapter tests and the end-to-end router tests use a real
//! in-memory SQLite database from `db::test_db` instead.

pub mod db;
pub mod fixtures;
pub mod mocks;

pub use db::*;
pub use fixtures::*;
pub use mocks::*;
