//! Auth service
//!
//! Handles registration, login and access token validation.

use std::sync::Arc;

use crate::app::activity::record_activity;
use crate::auth::{hash_password, verify_password, JwtService, MIN_PASSWORD_LENGTH};
use crate::domain::entities::{
    is_valid_email, normalize_email, ActivityAction, Address, NewActivity, NewUser, Role, User,
    UserId,
};
use crate::domain::ports::{ActivityRepository, UserRepository};
use crate::error::{AppError, DomainError};

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

/// Service for user accounts and access tokens
pub struct AuthService<UR, AR>
where
    UR: UserRepository,
    AR: ActivityRepository,
{
    users: Arc<UR>,
    activity: Arc<AR>,
    jwt: JwtService,
}

impl<UR, AR> AuthService<UR, AR>
where
    UR: UserRepository,
    AR: ActivityRepository,
{
    pub fn new(users: Arc<UR>, activity: Arc<AR>, jwt: JwtService) -> Self {
        Self {
            users,
            activity,
            jwt,
        }
    }

    /// Create a shopper account and return it with an access token
    pub async fn register(&self, input: Registration) -> Result<(User, String), AppError> {
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation("A valid email is required".to_string()).into());
        }
        if input.password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))
            .into());
        }
        let name = input.name.trim();
        let surname = input.surname.trim();
        if name.is_empty() || surname.is_empty() {
            return Err(
                DomainError::Validation("Name and surname are required".to_string()).into(),
            );
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "User with email '{}' already exists",
                email
            ))
            .into());
        }

        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash: hash_password(&input.password)?,
                name: name.to_string(),
                surname: surname.to_string(),
                phone: input.phone,
                address: input.address,
                role: Role::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::UserRegistered,
                format!("{} {} registered", user.name, user.surname),
            )
            .by(user.id)
            .on(user.id.0),
        )
        .await;

        let token = self.jwt.issue(&user)?;
        Ok((user, token))
    }

    /// Check credentials and issue an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let invalid = || DomainError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(invalid().into());
        }
        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is deactivated".to_string()).into());
        }

        self.users.update_last_login(&user.id).await?;
        let token = self.jwt.issue(&user)?;
        Ok((user, token))
    }

    /// Resolve a bearer token to an existing, active user
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self.jwt.verify(token)?;
        let user = self
            .users
            .find_by_id(&claims.user_id()?)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }

    pub async fn me(&self, id: &UserId) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
