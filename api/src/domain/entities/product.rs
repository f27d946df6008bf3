//! Product domain entity
//!
//! Catalog items plus the filter and sort types used to query them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{CategoryId, SubCategoryId};
use super::id::entity_id;
use super::user::UserId;

/// Active products with fewer units than this count as low stock
pub const LOW_STOCK_THRESHOLD: i32 = 10;

entity_id!(
    /// Unique identifier for a product
    ProductId
);

entity_id!(ProductImageId);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// `{id, name}` reference to the product's category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCategoryRef {
    pub id: SubCategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ProductImageId,
    pub image_url: String,
    pub is_primary: bool,
}

/// A catalog item
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub sku: String,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub materials: Vec<String>,
    pub gemstones: Vec<String>,
    pub featured: bool,
    pub on_sale: bool,
    pub sale_price: Option<f64>,
    pub rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub owner_id: Option<UserId>,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubCategoryId>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub tags: Option<String>,
    pub discount: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategoryRef>,
    pub subcategory: Option<SubCategoryRef>,
    pub product_images: Vec<ProductImage>,
}

impl Product {
    /// Sale price when the product is on sale and has one, list price otherwise
    pub fn effective_price(&self) -> f64 {
        match (self.on_sale, self.sale_price) {
            (true, Some(sale)) => sale,
            _ => self.price,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.is_active && self.stock < LOW_STOCK_THRESHOLD
    }

    /// Image used for cart and order lines
    pub fn primary_image(&self) -> String {
        self.image
            .clone()
            .or_else(|| {
                self.product_images
                    .iter()
                    .find(|i| i.is_primary)
                    .map(|i| i.image_url.clone())
            })
            .or_else(|| self.images.first().cloned())
            .unwrap_or_default()
    }
}

/// Data needed to create a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub sku: String,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub materials: Vec<String>,
    pub gemstones: Vec<String>,
    pub featured: bool,
    pub on_sale: bool,
    pub sale_price: Option<f64>,
    pub owner_id: Option<UserId>,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubCategoryId>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub tags: Option<String>,
    pub discount: Option<i32>,
}

/// Partial product update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub materials: Option<Vec<String>>,
    pub gemstones: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub on_sale: Option<bool>,
    pub sale_price: Option<f64>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubCategoryId>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub tags: Option<String>,
    pub discount: Option<i32>,
    pub is_active: Option<bool>,
}

/// Column a product listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Name,
    Price,
    #[default]
    CreatedAt,
    Rating,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "rating" => Ok(SortField::Rating),
            _ => Err(format!(
                "Invalid sortBy '{}': expected one of name, price, createdAt, rating",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sortOrder '{}': expected asc or desc", s)),
        }
    }
}

/// Catalog query filters. Only active products are ever returned.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub subcategory: Option<SubCategoryId>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Matches when the product shares at least one material
    pub materials: Vec<String>,
    pub gemstones: Vec<String>,
    pub on_sale: bool,
    pub featured: bool,
    /// Case-insensitive match on name, description or tags
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ProductFilter {
    /// Whether a product passes every filter; mirrors the SQL built by the
    /// SQLite adapter.
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active {
            return false;
        }
        if self.category.is_some_and(|c| c != product.category_id) {
            return false;
        }
        if self.subcategory.is_some() && self.subcategory != product.subcategory_id {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if !overlaps(&self.materials, &product.materials)
            || !overlaps(&self.gemstones, &product.gemstones)
        {
            return false;
        }
        if self.on_sale && !product.on_sale {
            return false;
        }
        if self.featured && !product.featured {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = product.name.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term)
                || product
                    .tags
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}

fn overlaps(wanted: &[String], have: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|w| have.contains(w))
}

/// Counters shown on the admin product page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: u64,
    pub featured_products: u64,
    pub on_sale_products: u64,
    pub low_stock_products: u64,
}

/// Product ranked by the number of order lines referencing it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub rating: f64,
    pub review_count: i32,
    pub sales_count: u64,
}
