//! Auth handlers
//!
//! Registration, login and the current user.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::app::Registration;
use crate::domain::entities::{Address, User};
use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let (user, access_token) = state
        .auth_service
        .register(Registration {
            email: request.email,
            password: request.password,
            name: request.name,
            surname: request.surname,
            phone: request.phone,
            address: request.address,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            AuthResponse { user, access_token },
            "User registered successfully",
        )),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let (user, access_token) = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(ApiResponse::with_message(
        AuthResponse { user, access_token },
        "Login successful",
    )))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state.auth_service.me(&user.id).await?;
    Ok(Json(ApiResponse::ok(user)))
}
