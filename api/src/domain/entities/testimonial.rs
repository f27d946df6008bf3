//! Customer testimonial entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::entity_id;

entity_id!(TestimonialId);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub text: String,
    /// 1..=5 stars
    pub rating: i32,
    pub image: Option<String>,
    pub location: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub name: String,
    pub text: String,
    pub rating: i32,
    pub image: Option<String>,
    pub location: Option<String>,
    pub verified: bool,
}
