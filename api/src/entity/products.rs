use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image: Option<String>,
    /// JSON array of image URLs
    pub images: Json,
    #[sea_orm(unique)]
    pub sku: String,
    pub weight: Option<f64>,
    /// `{length, width, height}`
    pub dimensions: Option<Json>,
    /// JSON array of strings
    pub materials: Json,
    /// JSON array of strings
    pub gemstones: Json,
    pub featured: bool,
    pub on_sale: bool,
    pub sale_price: Option<f64>,
    pub rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub owner_id: Option<Uuid>,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub tags: Option<String>,
    pub discount: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::sub_categories::Entity",
        from = "Column::SubcategoryId",
        to = "super::sub_categories::Column::Id",
        on_delete = "SetNull"
    )]
    SubCategory,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Owner,
    #[sea_orm(has_many = "super::product_images::Entity")]
    ProductImages,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::sub_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCategory.def()
    }
}

impl Related<super::product_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductImages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
