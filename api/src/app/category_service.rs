//! Category service

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::entities::{
    Category, CategoryId, CategoryUpdate, NewCategory, NewSubCategory, SubCategory,
};
use crate::domain::ports::CategoryRepository;
use crate::error::{AppError, DomainError};

/// Body for creating or updating a category or subcategory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

pub struct CategoryService<CR: CategoryRepository> {
    categories: Arc<CR>,
}

impl<CR: CategoryRepository> CategoryService<CR> {
    pub fn new(categories: Arc<CR>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.categories.list().await?)
    }

    pub async fn get(&self, id: &CategoryId) -> Result<Category, AppError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn create(&self, input: CategoryInput) -> Result<Category, AppError> {
        let name = required_name(input.name.as_deref())?;
        if self.name_taken(&name, None).await? {
            return Err(duplicate(&name));
        }

        let category = self
            .categories
            .create(&NewCategory {
                name,
                description: input.description,
                image: input.image,
            })
            .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update(&self, id: &CategoryId, input: CategoryInput) -> Result<Category, AppError> {
        self.get(id).await?;

        let name = match input.name.as_deref() {
            Some(raw) => Some(required_name(Some(raw))?),
            None => None,
        };
        if let Some(name) = &name {
            if self.name_taken(name, Some(id)).await? {
                return Err(duplicate(name));
            }
        }

        let update = CategoryUpdate {
            name,
            description: input.description,
            image: input.image,
        };
        Ok(self.categories.update(id, &update).await?)
    }

    /// Refuses while products still reference the category
    pub async fn delete(&self, id: &CategoryId) -> Result<(), AppError> {
        self.get(id).await?;

        let count = self.categories.count_products(id).await?;
        if count > 0 {
            return Err(DomainError::Conflict(format!(
                "Category still has {} product(s)",
                count
            ))
            .into());
        }

        self.categories.delete(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    pub async fn subcategories(&self, id: &CategoryId) -> Result<Vec<SubCategory>, AppError> {
        self.get(id).await?;
        Ok(self.categories.list_subcategories(id).await?)
    }

    pub async fn create_subcategory(
        &self,
        category_id: &CategoryId,
        input: CategoryInput,
    ) -> Result<SubCategory, AppError> {
        let name = required_name(input.name.as_deref())?;
        self.get(category_id).await?;

        Ok(self
            .categories
            .create_subcategory(&NewSubCategory {
                name,
                description: input.description,
                category_id: *category_id,
            })
            .await?)
    }

    async fn name_taken(&self, name: &str, except: Option<&CategoryId>) -> Result<bool, AppError> {
        Ok(self
            .categories
            .list()
            .await?
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name) && Some(&c.id) != except))
    }
}

fn required_name(raw: Option<&str>) -> Result<String, AppError> {
    raw.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DomainError::Validation("Name is required".to_string()).into())
}

fn duplicate(name: &str) -> AppError {
    DomainError::AlreadyExists(format!("Category '{}' already exists", name)).into()
}
