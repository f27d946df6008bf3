//! Authentication: JWT access tokens, password hashing and middleware

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::JwtService;
pub use middleware::{admin_middleware, auth_middleware};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
