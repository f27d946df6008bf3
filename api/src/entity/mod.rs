//! SeaORM entity models
//!
//! Table definitions used by the SQLite adapters. The schema is created from
//! these models at startup (see `adapters::sqlite::schema`).

pub mod activity_logs;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod product_images;
pub mod products;
pub mod sub_categories;
pub mod testimonials;
pub mod users;
