//! Schema bootstrap
//!
//! Tables are created straight from the SeaORM entities. Parents come before
//! children so foreign keys resolve.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::entity::{
    activity_logs, cart_items, carts, categories, order_items, orders, payments, product_images,
    products, sub_categories, testimonials, users,
};

pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, categories::Entity).await?;
    create_table(db, sub_categories::Entity).await?;
    create_table(db, products::Entity).await?;
    create_table(db, product_images::Entity).await?;
    create_table(db, carts::Entity).await?;
    create_table(db, cart_items::Entity).await?;
    create_table(db, orders::Entity).await?;
    create_table(db, order_items::Entity).await?;
    create_table(db, payments::Entity).await?;
    create_table(db, testimonials::Entity).await?;
    create_table(db, activity_logs::Entity).await?;

    tracing::debug!("Database schema ready");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}
