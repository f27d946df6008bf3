//! Testimonial handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::app::TestimonialInput;
use crate::domain::entities::Testimonial;
use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::AppState;

/// GET /api/testimonials
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Testimonial>>>, AppError> {
    let testimonials = state.testimonial_service.list().await?;
    Ok(Json(ApiResponse::ok(testimonials)))
}

/// POST /api/testimonials (admin)
pub async fn create_testimonial(
    State(state): State<AppState>,
    Json(input): Json<TestimonialInput>,
) -> Result<(StatusCode, Json<ApiResponse<Testimonial>>), AppError> {
    let testimonial = state.testimonial_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(testimonial))))
}
