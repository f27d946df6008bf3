//! SQLite adapter for TestimonialRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{NewTestimonial, Testimonial, TestimonialId};
use crate::domain::ports::TestimonialRepository;
use crate::entity::testimonials;
use crate::error::DomainError;

pub struct SqliteTestimonialRepository {
    db: DatabaseConnection,
}

impl SqliteTestimonialRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TestimonialRepository for SqliteTestimonialRepository {
    async fn list(&self) -> Result<Vec<Testimonial>, DomainError> {
        let rows = testimonials::Entity::find()
            .order_by_desc(testimonials::Column::Verified)
            .order_by_desc(testimonials::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, testimonial: &NewTestimonial) -> Result<Testimonial, DomainError> {
        let now = Utc::now();
        let result = testimonials::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(testimonial.name.clone()),
            text: Set(testimonial.text.clone()),
            rating: Set(testimonial.rating),
            image: Set(testimonial.image.clone()),
            location: Set(testimonial.location.clone()),
            verified: Set(testimonial.verified),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }
}

impl From<testimonials::Model> for Testimonial {
    fn from(model: testimonials::Model) -> Self {
        Testimonial {
            id: TestimonialId(model.id),
            name: model.name,
            text: model.text,
            rating: model.rating,
            image: model.image,
            location: model.location,
            verified: model.verified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
