//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::domain::{Identity, Role};
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::session::SessionKeys;

const MIN_PASSWORD_LEN: usize = 8;

pub struct SeaOrmAuthService {
    store: Store,
    keys: SessionKeys,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, keys: SessionKeys, security: SecurityConfig) -> Self {
        Self {
            store,
            keys,
            security,
        }
    }

    async fn identity_for(&self, user: User) -> Result<Identity, AuthError> {
        let role = self.store.get_user_role(user.id).await?;
        Ok(Identity {
            id: user.id,
            email: user.email,
            name: user.name,
            role,
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        // An unknown email and a wrong password both land here; callers
        // cannot tell which emails exist.
        let user = self
            .store
            .verify_password(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.keys.issue(user.id, &user.email)?;
        let user = self.identity_for(user).await?;

        Ok(LoginResult { token, user })
    }

    async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<LoginResult, AuthError> {
        let email = email.trim().to_lowercase();
        let name = name.trim();

        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }
        if name.is_empty() || name.len() > 100 {
            return Err(AuthError::Validation(
                "Name must be between 1 and 100 characters".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }

        let user = self
            .store
            .create_user(&email, name, password, Role::Requestor, Some(&self.security))
            .await?;

        let token = self.keys.issue(user.id, &user.email)?;
        let user = self.identity_for(user).await?;

        Ok(LoginResult { token, user })
    }

    async fn current_user(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let Some(claims) = self.keys.validate(token) else {
            return Ok(None);
        };

        // A valid token for a since-deleted account is anonymous too.
        let Some(user) = self.store.get_user_by_id(claims.sub).await? else {
            return Ok(None);
        };

        Ok(Some(self.identity_for(user).await?))
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(
                "New password must be at least 8 characters".to_string(),
            ));
        }
        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let verified = self
            .store
            .verify_password(&user.email, current_password)
            .await?;

        if verified.is_none() {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_password(user_id, new_password, Some(&self.security))
            .await?;

        Ok(())
    }
}
