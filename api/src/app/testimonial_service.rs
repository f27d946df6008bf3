//! Testimonial service

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::entities::{NewTestimonial, Testimonial};
use crate::domain::ports::TestimonialRepository;
use crate::error::{AppError, DomainError};

#[derive(Debug, Clone, Deserialize)]
pub struct TestimonialInput {
    pub name: String,
    pub text: String,
    pub rating: i32,
    pub image: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

pub struct TestimonialService<TR: TestimonialRepository> {
    testimonials: Arc<TR>,
}

impl<TR: TestimonialRepository> TestimonialService<TR> {
    pub fn new(testimonials: Arc<TR>) -> Self {
        Self { testimonials }
    }

    pub async fn list(&self) -> Result<Vec<Testimonial>, AppError> {
        Ok(self.testimonials.list().await?)
    }

    pub async fn create(&self, input: TestimonialInput) -> Result<Testimonial, AppError> {
        if !(1..=5).contains(&input.rating) {
            return Err(
                DomainError::Validation("Rating must be between 1 and 5".to_string()).into(),
            );
        }
        let name = input.name.trim();
        let text = input.text.trim();
        if name.is_empty() || text.is_empty() {
            return Err(DomainError::Validation("Name and text are required".to_string()).into());
        }

        Ok(self
            .testimonials
            .create(&NewTestimonial {
                name: name.to_string(),
                text: text.to_string(),
                rating: input.rating,
                image: input.image,
                location: input.location,
                verified: input.verified,
            })
            .await?)
    }
}
