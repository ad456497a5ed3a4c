//! Domain service for authentication and user management.
//!
//! Handles form login, self-registration and the admin operations exposed on the CLI.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User {0} does not exist")]
    UserNotFound(String),

    #[error("User {0} already exists")]
    UserExists(String),

    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

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

/// User info DTO for responses and the CLI.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Fields submitted by the registration form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

/// Username length bounds, in characters.
pub const USERNAME_LEN: (usize, usize) = (3, 20);

/// Field-level checks that need no database access. Returns every failure.
#[must_use]
pub fn validate_registration(form: &Registration, min_password_length: usize) -> Vec<String> {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let email_re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex")
    });

    let mut errors = Vec::new();

    let username = form.username.trim();
    let len = username.chars().count();
    if username.is_empty() {
        errors.push("Please enter a username".to_string());
    } else if len < USERNAME_LEN.0 || len > USERNAME_LEN.1 {
        errors.push(format!(
            "Username must be between {} and {} characters",
            USERNAME_LEN.0, USERNAME_LEN.1
        ));
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.push("Please enter an email address".to_string());
    } else if !email_re.is_match(email) {
        errors.push("Please enter a valid email address".to_string());
    }

    if form.password.is_empty() {
        errors.push("Please enter a password".to_string());
    } else if form.password.chars().count() < min_password_length {
        errors.push(format!(
            "Password must be at least {min_password_length} characters"
        ));
    }

    if form.password2.is_empty() {
        errors.push("Please confirm the password".to_string());
    } else if form.password2 != form.password {
        errors.push("Passwords do not match".to_string());
    }

    errors
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError>;

    /// Validates and stores a new non-admin user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] with every failed rule, including
    /// username or email already taken.
    async fn register(&self, form: &Registration) -> Result<UserInfo, AuthError>;

    /// Looks up the user a session points at.
    async fn get_user(&self, id: i32) -> Result<Option<UserInfo>, AuthError>;

    /// Creates an admin account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserExists`] when the username is taken.
    async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError>;

    async fn list_users(&self) -> Result<Vec<UserInfo>, AuthError>;

    /// Replaces a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for unknown usernames; nothing is changed.
    async fn reset_password(&self, username: &str, new_password: &str) -> Result<(), AuthError>;

    /// Creates the configured bootstrap admin when no user exists yet.
    /// Returns the created user, or `None` when users were already present.
    async fn ensure_default_admin(&self) -> Result<Option<UserInfo>, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str, password2: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&form("alice", "alice@example.com", "secret1", "secret1"), 6).is_empty());
    }

    #[test]
    fn test_registration_rules() {
        let errors = validate_registration(&form("al", "not-an-email", "123", "456"), 6);
        assert_eq!(errors.len(), 4);

        let long_name = "x".repeat(21);
        assert_eq!(
            validate_registration(&form(&long_name, "a@b.io", "secret1", "secret1"), 6).len(),
            1
        );

        let errors = validate_registration(&form("alice", "a@b.io", "secret1", "secret2"), 6);
        assert_eq!(errors, vec!["Passwords do not match".to_string()]);
    }

    #[test]
    fn test_username_length_counts_characters() {
        assert!(validate_registration(&form("张三丰", "z@example.com", "secret1", "secret1"), 6).is_empty());
    }
}
