//! Product service
//!
//! Catalog browsing for shoppers and product management for admins.

use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;

use crate::app::activity::record_activity;
use crate::app::{parse_field, parse_id, slugify};
use crate::domain::entities::{
    ActivityAction, CategoryId, Dimensions, NewActivity, NewProduct, Page, PageRequest, Product,
    ProductFilter, ProductId, ProductStats, ProductUpdate, SortField, SortOrder, SubCategoryId,
    User,
};
use crate::domain::ports::{ActivityRepository, CategoryRepository, ProductRepository};
use crate::error::{AppError, DomainError};

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const FEATURED_LIMIT: u64 = 6;
pub const SEARCH_LIMIT: u64 = 50;

/// Catalog listing query, as sent by the storefront
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Comma separated
    pub materials: Option<String>,
    /// Comma separated
    pub gemstones: Option<String>,
    pub on_sale: Option<bool>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub gemstones: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub on_sale: bool,
    pub sale_price: Option<f64>,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubCategoryId>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub tags: Option<String>,
    pub discount: Option<i32>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
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

/// Service for the product catalog
pub struct ProductService<PR, CR, AR>
where
    PR: ProductRepository,
    CR: CategoryRepository,
    AR: ActivityRepository,
{
    products: Arc<PR>,
    categories: Arc<CR>,
    activity: Arc<AR>,
}

impl<PR, CR, AR> ProductService<PR, CR, AR>
where
    PR: ProductRepository,
    CR: CategoryRepository,
    AR: ActivityRepository,
{
    pub fn new(products: Arc<PR>, categories: Arc<CR>, activity: Arc<AR>) -> Self {
        Self {
            products,
            categories,
            activity,
        }
    }

    /// Filtered, sorted, paginated listing of active products
    pub async fn list(&self, query: &ProductQuery) -> Result<Page<Product>, AppError> {
        let (sort_by, sort_order) = parse_sort(&query.sort_by, &query.sort_order)?;
        let filter = ProductFilter {
            category: optional_id(&query.category, "category")?,
            subcategory: optional_id(&query.subcategory, "subcategory")?,
            min_price: query.min_price,
            max_price: query.max_price,
            materials: split_list(&query.materials),
            gemstones: split_list(&query.gemstones),
            on_sale: query.on_sale.unwrap_or(false),
            featured: query.featured.unwrap_or(false),
            search: non_blank(&query.search),
            sort_by,
            sort_order,
        };
        let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);

        Ok(self.products.list(&filter, page).await?)
    }

    /// Newest featured products
    pub async fn featured(&self, limit: Option<i64>) -> Result<Vec<Product>, AppError> {
        let filter = ProductFilter {
            featured: true,
            ..Default::default()
        };
        let page = PageRequest::new(Some(1), limit, FEATURED_LIMIT);
        Ok(self.products.list(&filter, page).await?.items)
    }

    /// A single active product
    pub async fn get(&self, id: &ProductId) -> Result<Product, AppError> {
        match self.products.find_by_id(id).await? {
            Some(product) if product.is_active => Ok(product),
            _ => Err(AppError::NotFound("Product not found".to_string())),
        }
    }

    pub async fn by_category(
        &self,
        category: &CategoryId,
        limit: Option<i64>,
    ) -> Result<Vec<Product>, AppError> {
        let filter = ProductFilter {
            category: Some(*category),
            ..Default::default()
        };
        let page = PageRequest::new(Some(1), limit, DEFAULT_PAGE_SIZE);
        Ok(self.products.list(&filter, page).await?.items)
    }

    /// Free text search; `q` is mandatory
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, AppError> {
        let term = non_blank(&query.q)
            .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;
        let (sort_by, sort_order) = parse_sort(&query.sort_by, &query.sort_order)?;

        let filter = ProductFilter {
            category: optional_id(&query.category, "category")?,
            min_price: query.min_price,
            max_price: query.max_price,
            search: Some(term),
            sort_by,
            sort_order,
            ..Default::default()
        };
        let page = PageRequest {
            page: 1,
            limit: SEARCH_LIMIT,
        };
        Ok(self.products.list(&filter, page).await?.items)
    }

    pub async fn create(&self, owner: &User, input: CreateProduct) -> Result<Product, AppError> {
        let name = input.name.trim().to_string();
        let description = input.description.trim().to_string();
        if name.is_empty() || description.is_empty() {
            return Err(
                DomainError::Validation("Name and description are required".to_string()).into(),
            );
        }
        validate_amounts(
            Some(input.price),
            Some(input.stock),
            input.sale_price,
            input.discount,
        )?;
        self.ensure_category(&input.category_id).await?;

        let sku = match non_blank(&input.sku) {
            Some(sku) => sku,
            None => generate_sku(),
        };
        let slug = non_blank(&input.slug).unwrap_or_else(|| slugify(&name));

        let product = self
            .products
            .create(&NewProduct {
                name,
                description,
                price: input.price,
                stock: input.stock,
                image: input.image,
                images: input.images,
                sku,
                weight: input.weight,
                dimensions: input.dimensions,
                materials: input.materials,
                gemstones: input.gemstones,
                featured: input.featured,
                on_sale: input.on_sale,
                sale_price: input.sale_price,
                owner_id: Some(owner.id),
                category_id: input.category_id,
                subcategory_id: input.subcategory_id,
                meta_title: input.meta_title,
                meta_description: input.meta_description,
                slug: Some(slug),
                tags: input.tags,
                discount: input.discount,
            })
            .await?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::ProductCreated,
                format!("Product '{}' created", product.name),
            )
            .by(owner.id)
            .on(product.id.0),
        )
        .await;

        Ok(product)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: &ProductId,
        input: UpdateProduct,
    ) -> Result<Product, AppError> {
        if self.products.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        let name = input.name.map(|n| n.trim().to_string());
        let description = input.description.map(|d| d.trim().to_string());
        if name.as_deref() == Some("") || description.as_deref() == Some("") {
            return Err(DomainError::Validation(
                "Name and description cannot be empty".to_string(),
            )
            .into());
        }
        validate_amounts(input.price, input.stock, input.sale_price, input.discount)?;
        if let Some(category_id) = &input.category_id {
            self.ensure_category(category_id).await?;
        }

        let update = ProductUpdate {
            name,
            description,
            price: input.price,
            stock: input.stock,
            image: input.image,
            images: input.images,
            sku: input.sku,
            weight: input.weight,
            dimensions: input.dimensions,
            materials: input.materials,
            gemstones: input.gemstones,
            featured: input.featured,
            on_sale: input.on_sale,
            sale_price: input.sale_price,
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            meta_title: input.meta_title,
            meta_description: input.meta_description,
            slug: input.slug,
            tags: input.tags,
            discount: input.discount,
            is_active: input.is_active,
        };
        let product = self.products.update(id, &update).await?;

        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::ProductUpdated,
                format!("Product '{}' updated", product.name),
            )
            .by(actor.id)
            .on(product.id.0),
        )
        .await;

        Ok(product)
    }

    /// Soft delete
    pub async fn delete(&self, actor: &User, id: &ProductId) -> Result<(), AppError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        self.products.deactivate(id).await?;

        tracing::info!(product_id = %id, "Product deactivated");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::ProductDeleted,
                format!("Product '{}' deleted", product.name),
            )
            .by(actor.id)
            .on(id.0),
        )
        .await;

        Ok(())
    }

    pub async fn stats(&self) -> Result<ProductStats, AppError> {
        Ok(self.products.stats().await?)
    }

    async fn ensure_category(&self, id: &CategoryId) -> Result<(), AppError> {
        if self.categories.find_by_id(id).await?.is_none() {
            return Err(DomainError::Validation(format!("Category {} does not exist", id)).into());
        }
        Ok(())
    }
}

fn parse_sort(
    sort_by: &Option<String>,
    sort_order: &Option<String>,
) -> Result<(SortField, SortOrder), AppError> {
    let field = match sort_by.as_deref() {
        Some(raw) => parse_field::<SortField>(raw)?,
        None => SortField::default(),
    };
    let order = match sort_order.as_deref() {
        Some(raw) => parse_field::<SortOrder>(raw)?,
        None => SortOrder::default(),
    };
    Ok((field, order))
}

fn optional_id<T: From<uuid::Uuid>>(raw: &Option<String>, field: &str) -> Result<Option<T>, AppError> {
    non_blank(raw).map(|r| parse_id(&r, field)).transpose()
}

fn non_blank(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn split_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn validate_amounts(
    price: Option<f64>,
    stock: Option<i32>,
    sale_price: Option<f64>,
    discount: Option<i32>,
) -> Result<(), DomainError> {
    if price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(DomainError::Validation("Price must be a non-negative number".to_string()));
    }
    if sale_price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(DomainError::Validation(
            "Sale price must be a non-negative number".to_string(),
        ));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(DomainError::Validation("Stock cannot be negative".to_string()));
    }
    if discount.is_some_and(|d| !(0..=100).contains(&d)) {
        return Err(DomainError::Validation(
            "Discount must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

/// `SKU-<epoch millis>-<9 lowercase alphanumerics>`
fn generate_sku() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("SKU-{}-{}", Utc::now().timestamp_millis(), suffix)
}
