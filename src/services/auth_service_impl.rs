//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::auth_service::{
    AuthError, AuthService, Registration, UserInfo, validate_registration,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(UserInfo::from(user))
    }

    async fn register(&self, form: &Registration) -> Result<UserInfo, AuthError> {
        let mut errors = validate_registration(form, self.security.min_password_length);

        let username = form.username.trim();
        let email = form.email.trim();

        if !username.is_empty() && self.store.get_user_by_username(username).await?.is_some() {
            errors.push("That username is already taken".to_string());
        }
        if !email.is_empty() && self.store.get_user_by_email(email).await?.is_some() {
            errors.push("That email address is already registered".to_string());
        }

        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = self
            .store
            .create_user(username, email, &form.password, false, &self.security)
            .await?;

        info!(username = %user.username, "User registered");
        Ok(UserInfo::from(user))
    }

    async fn get_user(&self, id: i32) -> Result<Option<UserInfo>, AuthError> {
        Ok(self.store.get_user_by_id(id).await?.map(UserInfo::from))
    }

    async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError> {
        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let user = self
            .store
            .create_user(username, email, password, true, &self.security)
            .await?;

        info!(username = %user.username, "Admin user created");
        Ok(UserInfo::from(user))
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, AuthError> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    async fn reset_password(&self, username: &str, new_password: &str) -> Result<(), AuthError> {
        if new_password.is_empty() {
            return Err(AuthError::Validation(vec![
                "New password cannot be empty".to_string(),
            ]));
        }

        let updated = self
            .store
            .update_user_password(username, new_password, &self.security)
            .await?;

        if !updated {
            return Err(AuthError::UserNotFound(username.to_string()));
        }

        info!(username, "Password reset");
        Ok(())
    }

    async fn ensure_default_admin(&self) -> Result<Option<UserInfo>, AuthError> {
        if self.store.count_users().await? > 0 {
            return Ok(None);
        }

        let user = self
            .store
            .create_user(
                &self.security.bootstrap_admin_username,
                &self.security.bootstrap_admin_email,
                &self.security.bootstrap_admin_password,
                true,
                &self.security,
            )
            .await?;

        warn!(
            username = %user.username,
            "Created bootstrap admin with the configured default password; change it after first login"
        );
        Ok(Some(UserInfo::from(user)))
    }
}
