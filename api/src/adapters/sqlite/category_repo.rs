//! SQLite adapter for CategoryRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{
    Category, CategoryId, CategoryUpdate, NewCategory, NewSubCategory, SubCategory, SubCategoryId,
};
use crate::domain::ports::CategoryRepository;
use crate::entity::{categories, products, sub_categories};
use crate::error::DomainError;

/// SQLite implementation of CategoryRepository
pub struct SqliteCategoryRepository {
    db: DatabaseConnection,
}

impl SqliteCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_subcategories(
        &self,
        models: Vec<categories::Model>,
    ) -> Result<Vec<Category>, DomainError> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let subs = sub_categories::Entity::find()
            .filter(sub_categories::Column::CategoryId.is_in(ids))
            .order_by_asc(sub_categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut by_category: HashMap<Uuid, Vec<SubCategory>> = HashMap::new();
        for sub in subs {
            by_category
                .entry(sub.category_id)
                .or_default()
                .push(sub.into());
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let subcategories = by_category.remove(&m.id).unwrap_or_default();
                to_category(m, subcategories)
            })
            .collect())
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.with_subcategories(models).await
    }

    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, DomainError> {
        let Some(model) = categories::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        Ok(self.with_subcategories(vec![model]).await?.pop())
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, DomainError> {
        let now = Utc::now();
        let model = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            image: Set(category.image.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;
        Ok(to_category(result, Vec::new()))
    }

    async fn update(
        &self,
        id: &CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, DomainError> {
        let mut model = categories::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = &update.name {
            model.name = Set(name.clone());
        }
        if let Some(description) = &update.description {
            model.description = Set(Some(description.clone()));
        }
        if let Some(image) = &update.image {
            model.image = Set(Some(image.clone()));
        }

        let result = model.update(&self.db).await.map_err(db_err)?;
        self.with_subcategories(vec![result])
            .await?
            .pop()
            .ok_or_else(|| DomainError::NotFound(format!("Category {} not found", id)))
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), DomainError> {
        let result = categories::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }

    async fn count_products(&self, id: &CategoryId) -> Result<u64, DomainError> {
        products::Entity::find()
            .filter(products::Column::CategoryId.eq(id.0))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn list_subcategories(&self, id: &CategoryId) -> Result<Vec<SubCategory>, DomainError> {
        let subs = sub_categories::Entity::find()
            .filter(sub_categories::Column::CategoryId.eq(id.0))
            .order_by_asc(sub_categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(subs.into_iter().map(|m| m.into()).collect())
    }

    async fn create_subcategory(&self, sub: &NewSubCategory) -> Result<SubCategory, DomainError> {
        let now = Utc::now();
        let model = sub_categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(sub.name.clone()),
            description: Set(sub.description.clone()),
            category_id: Set(sub.category_id.0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;
        Ok(result.into())
    }
}

fn to_category(model: categories::Model, subcategories: Vec<SubCategory>) -> Category {
    Category {
        id: CategoryId(model.id),
        name: model.name,
        description: model.description,
        image: model.image,
        subcategories,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

impl From<sub_categories::Model> for SubCategory {
    fn from(model: sub_categories::Model) -> Self {
        SubCategory {
            id: SubCategoryId(model.id),
            name: model.name,
            description: model.description,
            category_id: CategoryId(model.category_id),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
