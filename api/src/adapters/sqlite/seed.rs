//! Demo catalog data
//!
//! Each group is only written when its table is still empty, so seeding is
//! safe to run on every start.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use super::{
    db_err, SqliteCategoryRepository, SqliteProductRepository, SqliteTestimonialRepository,
};
use crate::domain::entities::{Category, NewCategory, NewProduct, NewSubCategory, NewTestimonial};
use crate::domain::ports::{CategoryRepository, ProductRepository, TestimonialRepository};
use crate::entity::{categories, products, testimonials};
use crate::error::DomainError;

const CATEGORIES: [(&str, &str, &str); 4] = [
    (
        "Rings",
        "Beautiful rings for every occasion",
        "https://images.unsplash.com/photo-1605100804763-247f67b3557e?w=500",
    ),
    (
        "Earrings",
        "Elegant earrings to complement your style",
        "https://images.unsplash.com/photo-1535632066927-ab7c9ab60908?w=500",
    ),
    (
        "Necklaces",
        "Stunning necklaces for any outfit",
        "https://images.unsplash.com/photo-1515562141207-7a88fb7ce338?w=500",
    ),
    (
        "Bracelets",
        "Charming bracelets to complete your look",
        "https://images.unsplash.com/photo-1611591437281-460bfbe1220a?w=500",
    ),
];

/// (subcategory, parent category)
const SUBCATEGORIES: [(&str, &str); 4] = [
    ("Engagement Rings", "Rings"),
    ("Wedding Rings", "Rings"),
    ("Pearl Earrings", "Earrings"),
    ("Diamond Necklaces", "Necklaces"),
];

const TESTIMONIALS: [(&str, &str, &str); 3] = [
    (
        "Sarah Johnson",
        "Absolutely stunning jewelry! The quality is exceptional and the designs are timeless.",
        "New York, NY",
    ),
    (
        "Emma Davis",
        "I've bought several pieces and each one is more beautiful than the last. Highly recommend!",
        "London, UK",
    ),
    (
        "Lisa Chen",
        "The customer service is outstanding and the jewelry is exactly as pictured. Love it!",
        "San Francisco, CA",
    ),
];

pub async fn seed_database(db: &DatabaseConnection) -> Result<(), DomainError> {
    let category_repo = SqliteCategoryRepository::new(db.clone());
    let product_repo = SqliteProductRepository::new(db.clone());
    let testimonial_repo = SqliteTestimonialRepository::new(db.clone());

    if categories::Entity::find().count(db).await.map_err(db_err)? == 0 {
        for (name, description, image) in CATEGORIES {
            category_repo
                .create(&NewCategory {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    image: Some(image.to_string()),
                })
                .await?;
        }

        let created = category_repo.list().await?;
        for (sub, parent) in SUBCATEGORIES {
            if let Some(category) = created.iter().find(|c| c.name == parent) {
                category_repo
                    .create_subcategory(&NewSubCategory {
                        name: sub.to_string(),
                        description: None,
                        category_id: category.id,
                    })
                    .await?;
            }
        }
        tracing::info!("Seeded categories and subcategories");
    }

    if testimonials::Entity::find().count(db).await.map_err(db_err)? == 0 {
        for (name, text, location) in TESTIMONIALS {
            testimonial_repo
                .create(&NewTestimonial {
                    name: name.to_string(),
                    text: text.to_string(),
                    rating: 5,
                    image: None,
                    location: Some(location.to_string()),
                    verified: true,
                })
                .await?;
        }
        tracing::info!("Seeded testimonials");
    }

    if products::Entity::find().count(db).await.map_err(db_err)? == 0 {
        let categories = category_repo.list().await?;
        for product in demo_products(&categories) {
            product_repo.create(&product).await?;
        }
        tracing::info!("Seeded featured products");
    }

    Ok(())
}

fn demo_products(categories: &[Category]) -> Vec<NewProduct> {
    let find = |name: &str| categories.iter().find(|c| c.name == name).map(|c| c.id);

    let specs = [
        (
            "Rose Gold Diamond Ring",
            "Elegant rose gold ring with brilliant diamond",
            1299.0,
            10,
            "Rings",
            "https://images.unsplash.com/photo-1605100804763-247f67b3557e?w=600",
            "rose gold",
            Some("diamond"),
        ),
        (
            "Pearl Drop Earrings",
            "Classic pearl drop earrings for any occasion",
            299.0,
            15,
            "Earrings",
            "https://images.unsplash.com/photo-1515562141207-7a88fb7ce338?w=300",
            "silver",
            Some("pearl"),
        ),
        (
            "Elegant Gold Necklace",
            "Timeless gold necklace with intricate design",
            899.0,
            8,
            "Necklaces",
            "https://images.unsplash.com/photo-1599643478518-a784e5dc4c8f?w=300",
            "gold",
            None,
        ),
    ];

    specs
        .into_iter()
        .enumerate()
        .filter_map(
            |(i, (name, description, price, stock, category, image, material, gemstone))| {
                Some(NewProduct {
                    name: name.to_string(),
                    description: description.to_string(),
                    price,
                    stock,
                    image: Some(image.to_string()),
                    images: vec![image.to_string()],
                    sku: format!("SKU-SEED-{:04}", i + 1),
                    weight: None,
                    dimensions: None,
                    materials: vec![material.to_string()],
                    gemstones: gemstone.map(|g| vec![g.to_string()]).unwrap_or_default(),
                    featured: true,
                    on_sale: false,
                    sale_price: None,
                    owner_id: None,
                    category_id: find(category)?,
                    subcategory_id: None,
                    meta_title: None,
                    meta_description: None,
                    slug: Some(crate::app::slugify(name)),
                    tags: None,
                    discount: None,
                })
            },
        )
        .collect()
}
