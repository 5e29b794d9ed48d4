//! Authentication
//!
//! Password hashing, bearer tokens, the login/register/change-password flows
//! and the middleware guarding the protected routes.

mod middleware;
mod password;
mod service;
mod token;

pub use middleware::require_auth;
pub use password::{hash_password, verify_password};
pub use service::{AuthService, ADMIN_USER_ID};
pub use token::{Claims, TokenService};

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Registration is disabled")]
    RegistrationDisabled,

    #[error("Authentication failure: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken | AuthError::RegistrationDisabled => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
