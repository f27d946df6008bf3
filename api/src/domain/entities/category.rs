//! Category domain entities

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::entity_id;

entity_id!(
    /// Unique identifier for a category
    CategoryId
);

entity_id!(
    /// Unique identifier for a subcategory
    SubCategoryId
);

/// Top-level catalog grouping (Rings, Earrings, ...)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub subcategories: Vec<SubCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub name: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Partial category update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSubCategory {
    pub name: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
}
