//! SQLite adapter for ProductRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, LikeExpr, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::{db_err, from_json, to_json};
use crate::domain::entities::{
    CategoryId, CategoryRef, NewProduct, Page, PageRequest, Product, ProductFilter, ProductId,
    ProductImage, ProductImageId, ProductStats, ProductUpdate, SortField, SortOrder,
    SubCategoryId, SubCategoryRef, TopProduct, UserId, LOW_STOCK_THRESHOLD,
};
use crate::domain::ports::ProductRepository;
use crate::entity::{categories, order_items, product_images, products, sub_categories};
use crate::error::DomainError;

/// SQLite implementation of ProductRepository
pub struct SqliteProductRepository {
    db: DatabaseConnection,
}

impl SqliteProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach category, subcategory and gallery rows to a batch of products
    async fn with_relations(
        &self,
        models: Vec<products::Model>,
    ) -> Result<Vec<Product>, DomainError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let category_ids: Vec<Uuid> = models.iter().map(|m| m.category_id).collect();
        let sub_ids: Vec<Uuid> = models.iter().filter_map(|m| m.subcategory_id).collect();

        let categories: HashMap<Uuid, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let subcategories: HashMap<Uuid, String> = sub_categories::Entity::find()
            .filter(sub_categories::Column::Id.is_in(sub_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let mut images: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for image in product_images::Entity::find()
            .filter(product_images::Column::ProductId.is_in(product_ids))
            .order_by_desc(product_images::Column::IsPrimary)
            .order_by_asc(product_images::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
        {
            images.entry(image.product_id).or_default().push(ProductImage {
                id: ProductImageId(image.id),
                image_url: image.image_url,
                is_primary: image.is_primary,
            });
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let category = categories.get(&m.category_id).map(|name| CategoryRef {
                    id: CategoryId(m.category_id),
                    name: name.clone(),
                });
                let subcategory = m.subcategory_id.and_then(|sid| {
                    subcategories.get(&sid).map(|name| SubCategoryRef {
                        id: SubCategoryId(sid),
                        name: name.clone(),
                    })
                });
                let gallery = images.remove(&m.id).unwrap_or_default();
                to_product(m, category, subcategory, gallery)
            })
            .collect())
    }

    async fn load(&self, id: Uuid) -> Result<Product, DomainError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))?;

        self.with_relations(vec![model])
            .await?
            .pop()
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))
    }
}

/// Replace the gallery rows of a product; the first image becomes primary
async fn replace_images<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    urls: &[String],
) -> Result<(), DomainError> {
    product_images::Entity::delete_many()
        .filter(product_images::Column::ProductId.eq(product_id))
        .exec(db)
        .await
        .map_err(db_err)?;

    let now = Utc::now();
    for (i, url) in urls.iter().enumerate() {
        product_images::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            image_url: Set(url.clone()),
            is_primary: Set(i == 0),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

/// Escape LIKE wildcards; pair with `ESCAPE '\'`
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// JSON-array overlap: any of the wanted strings appears as an element
fn json_overlap(column: products::Column, wanted: &[String]) -> Condition {
    wanted.iter().fold(Condition::any(), |cond, value| {
        let needle = escape_like(&serde_json::to_string(value).unwrap_or_default());
        cond.add(Expr::col(column).like(LikeExpr::new(format!("%{}%", needle)).escape('\\')))
    })
}

fn apply_filter(
    mut query: Select<products::Entity>,
    filter: &ProductFilter,
) -> Select<products::Entity> {
    query = query.filter(products::Column::IsActive.eq(true));

    if let Some(category) = filter.category {
        query = query.filter(products::Column::CategoryId.eq(category.0));
    }
    if let Some(sub) = filter.subcategory {
        query = query.filter(products::Column::SubcategoryId.eq(sub.0));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(products::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(products::Column::Price.lte(max));
    }
    if !filter.materials.is_empty() {
        query = query.filter(json_overlap(products::Column::Materials, &filter.materials));
    }
    if !filter.gemstones.is_empty() {
        query = query.filter(json_overlap(products::Column::Gemstones, &filter.gemstones));
    }
    if filter.on_sale {
        query = query.filter(products::Column::OnSale.eq(true));
    }
    if filter.featured {
        query = query.filter(products::Column::Featured.eq(true));
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        // SQLite LIKE is case-insensitive for ASCII
        query = query.filter(
            Condition::any()
                .add(products::Column::Name.contains(term))
                .add(products::Column::Description.contains(term))
                .add(products::Column::Tags.contains(term)),
        );
    }

    let column = match filter.sort_by {
        SortField::Name => products::Column::Name,
        SortField::Price => products::Column::Price,
        SortField::CreatedAt => products::Column::CreatedAt,
        SortField::Rating => products::Column::Rating,
    };
    let order = match filter.sort_order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };

    query
        .order_by(column, order)
        .order_by_desc(products::Column::CreatedAt)
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let query = apply_filter(products::Entity::find(), filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Page::new(self.with_relations(models).await?, total, page))
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        match self.load(id.0).await {
            Ok(product) => Ok(Some(product)),
            Err(DomainError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, DomainError> {
        let models = products::Entity::find()
            .filter(products::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.with_relations(models).await
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let dimensions = match &product.dimensions {
            Some(d) => Some(to_json(d)?),
            None => None,
        };

        let model = products::ActiveModel {
            id: Set(id),
            name: Set(product.name.clone()),
            description: Set(product.description.clone()),
            price: Set(product.price),
            stock: Set(product.stock),
            image: Set(product.image.clone()),
            images: Set(to_json(&product.images)?),
            sku: Set(product.sku.clone()),
            weight: Set(product.weight),
            dimensions: Set(dimensions),
            materials: Set(to_json(&product.materials)?),
            gemstones: Set(to_json(&product.gemstones)?),
            featured: Set(product.featured),
            on_sale: Set(product.on_sale),
            sale_price: Set(product.sale_price),
            rating: Set(0.0),
            review_count: Set(0),
            is_active: Set(true),
            owner_id: Set(product.owner_id.map(|o| o.0)),
            category_id: Set(product.category_id.0),
            subcategory_id: Set(product.subcategory_id.map(|s| s.0)),
            meta_title: Set(product.meta_title.clone()),
            meta_description: Set(product.meta_description.clone()),
            slug: Set(product.slug.clone()),
            tags: Set(product.tags.clone()),
            discount: Set(product.discount),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(db_err)?;
        replace_images(&self.db, id, &product.images).await?;

        self.load(id).await
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<Product, DomainError> {
        let existing = products::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))?;

        let mut model = existing.into_active_model();
        if let Some(v) = &update.name {
            model.name = Set(v.clone());
        }
        if let Some(v) = &update.description {
            model.description = Set(v.clone());
        }
        if let Some(v) = update.price {
            model.price = Set(v);
        }
        if let Some(v) = update.stock {
            model.stock = Set(v);
        }
        if let Some(v) = &update.image {
            model.image = Set(Some(v.clone()));
        }
        if let Some(v) = &update.images {
            model.images = Set(to_json(v)?);
        }
        if let Some(v) = &update.sku {
            model.sku = Set(v.clone());
        }
        if let Some(v) = update.weight {
            model.weight = Set(Some(v));
        }
        if let Some(v) = &update.dimensions {
            model.dimensions = Set(Some(to_json(v)?));
        }
        if let Some(v) = &update.materials {
            model.materials = Set(to_json(v)?);
        }
        if let Some(v) = &update.gemstones {
            model.gemstones = Set(to_json(v)?);
        }
        if let Some(v) = update.featured {
            model.featured = Set(v);
        }
        if let Some(v) = update.on_sale {
            model.on_sale = Set(v);
        }
        if let Some(v) = update.sale_price {
            model.sale_price = Set(Some(v));
        }
        if let Some(v) = update.category_id {
            model.category_id = Set(v.0);
        }
        if let Some(v) = update.subcategory_id {
            model.subcategory_id = Set(Some(v.0));
        }
        if let Some(v) = &update.meta_title {
            model.meta_title = Set(Some(v.clone()));
        }
        if let Some(v) = &update.meta_description {
            model.meta_description = Set(Some(v.clone()));
        }
        if let Some(v) = &update.slug {
            model.slug = Set(Some(v.clone()));
        }
        if let Some(v) = &update.tags {
            model.tags = Set(Some(v.clone()));
        }
        if let Some(v) = update.discount {
            model.discount = Set(Some(v));
        }
        if let Some(v) = update.is_active {
            model.is_active = Set(v);
        }
        model.updated_at = Set(Utc::now());

        model.update(&self.db).await.map_err(db_err)?;
        if let Some(images) = &update.images {
            replace_images(&self.db, id.0, images).await?;
        }

        self.load(id.0).await
    }

    async fn deactivate(&self, id: &ProductId) -> Result<(), DomainError> {
        products::ActiveModel {
            id: Set(id.0),
            is_active: Set(false),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match db_err(e) {
            DomainError::NotFound(_) => DomainError::NotFound(format!("Product {} not found", id)),
            e => e,
        })?;

        Ok(())
    }

    async fn stats(&self) -> Result<ProductStats, DomainError> {
        let active = || products::Entity::find().filter(products::Column::IsActive.eq(true));

        let total_products = active().count(&self.db).await.map_err(db_err)?;
        let featured_products = active()
            .filter(products::Column::Featured.eq(true))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let on_sale_products = active()
            .filter(products::Column::OnSale.eq(true))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let low_stock_products = active()
            .filter(products::Column::Stock.lt(LOW_STOCK_THRESHOLD))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(ProductStats {
            total_products,
            featured_products,
            on_sale_products,
            low_stock_products,
        })
    }

    async fn top_selling(&self, limit: u64) -> Result<Vec<TopProduct>, DomainError> {
        let counts: HashMap<Uuid, i64> = order_items::Entity::find()
            .select_only()
            .column(order_items::Column::ProductId)
            .column_as(order_items::Column::Id.count(), "sales_count")
            .group_by(order_items::Column::ProductId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .collect();

        let mut ranked: Vec<(i64, products::Model)> = products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|m| (counts.get(&m.id).copied().unwrap_or(0), m))
            .collect();

        ranked.sort_by(|(ca, a), (cb, b)| cb.cmp(ca).then(b.created_at.cmp(&a.created_at)));

        Ok(ranked
            .into_iter()
            .take(limit as usize)
            .map(|(count, m)| TopProduct {
                id: ProductId(m.id),
                name: m.name,
                price: m.price,
                stock: m.stock,
                rating: m.rating,
                review_count: m.review_count,
                sales_count: count.max(0) as u64,
            })
            .collect())
    }
}

fn to_product(
    model: products::Model,
    category: Option<CategoryRef>,
    subcategory: Option<SubCategoryRef>,
    product_images: Vec<ProductImage>,
) -> Product {
    Product {
        id: ProductId(model.id),
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        image: model.image,
        images: from_json(model.images),
        sku: model.sku,
        weight: model.weight,
        dimensions: model.dimensions.and_then(|d| serde_json::from_value(d).ok()),
        materials: from_json(model.materials),
        gemstones: from_json(model.gemstones),
        featured: model.featured,
        on_sale: model.on_sale,
        sale_price: model.sale_price,
        rating: model.rating,
        review_count: model.review_count,
        is_active: model.is_active,
        owner_id: model.owner_id.map(UserId),
        category_id: CategoryId(model.category_id),
        subcategory_id: model.subcategory_id.map(SubCategoryId),
        meta_title: model.meta_title,
        meta_description: model.meta_description,
        slug: model.slug,
        tags: model.tags,
        discount: model.discount,
        created_at: model.created_at,
        updated_at: model.updated_at,
        category,
        subcategory,
        product_images,
    }
}
