//! Domain service for authentication and account management.
//!
//! Handles login, registration, token validation, and password changes.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Identity;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailInUse,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Login/register result: a signed token plus the user it identifies.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: Identity,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password; the two cases are indistinguishable to the caller.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Creates an account with the default requestor role and issues a
    /// session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailInUse`] if the email is taken.
    async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<LoginResult, AuthError>;

    /// Resolves a presented token to an identity. Invalid, expired, or
    /// orphaned tokens resolve to `None` (anonymous).
    async fn current_user(&self, token: &str) -> Result<Option<Identity>, AuthError>;

    /// Changes a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong
    /// or the new one is unacceptable.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
