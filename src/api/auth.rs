use axum::{
    Form,
    extract::{Query, Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::{Expiry, Session};
use tracing::{error, info, warn};

use super::validation::safe_redirect_target;
use super::{ApiError, AppState, pages};
use crate::services::{AuthError, Registration};

pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";
const FLASH_KEY: &str = "_flashes";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

// ============================================================================
// Session helpers
// ============================================================================

pub async fn push_flash(session: &Session, category: &str, message: impl Into<String>) {
    let mut flashes: Vec<Flash> = session
        .get(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    flashes.push(Flash {
        category: category.to_string(),
        message: message.into(),
    });

    if let Err(e) = session.insert(FLASH_KEY, flashes).await {
        warn!(error = %e, "Failed to store flash message");
    }
}

pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

pub async fn session_user(session: &Session) -> Option<(i32, String)> {
    let id = session.get::<i32>(USER_ID_KEY).await.ok().flatten()?;
    let username = session
        .get::<String>(USERNAME_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    Some((id, username))
}

pub(super) fn login_url(next: Option<&str>) -> String {
    match next {
        Some(next) => {
            let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
            format!("/login?next={encoded}")
        }
        None => "/login".to_string(),
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without a logged-in session with a 401 envelope.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some((user_id, _)) = session_user(&session).await else {
        return Err(ApiError::unauthorized("Login required"));
    };

    match state.shared.auth_service.get_user(user_id).await {
        Ok(Some(user)) => {
            tracing::Span::current().record("user_id", user.username.as_str());
            Ok(next.run(request).await)
        }
        Ok(None) => Err(ApiError::unauthorized("Login required")),
        Err(e) => Err(ApiError::internal(format!("Session lookup failed: {e}"))),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn dashboard(session: Session) -> Response {
    let Some((_, username)) = session_user(&session).await else {
        return Redirect::to(&login_url(Some("/"))).into_response();
    };

    let flashes = take_flashes(&session).await;
    Html(pages::dashboard(&username, &flashes)).into_response()
}

/// GET /login
pub async fn login_page(session: Session, Query(query): Query<NextQuery>) -> Response {
    if session_user(&session).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let flashes = take_flashes(&session).await;
    Html(pages::login(&flashes, query.next.as_deref())).into_response()
}

/// POST /login
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, ApiError> {
    let next = query.next.as_deref();

    match state
        .shared
        .auth_service
        .login(form.username.trim(), &form.password)
        .await
    {
        Ok(user) => {
            session
                .cycle_id()
                .await
                .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
            session
                .insert(USER_ID_KEY, user.id)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
            session
                .insert(USERNAME_KEY, &user.username)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

            if form.remember_me.is_some() {
                let days = state.shared.config.read().await.server.remember_me_days;
                session.set_expiry(Some(Expiry::AtDateTime(
                    time::OffsetDateTime::now_utc() + time::Duration::days(days),
                )));
            }

            info!(username = %user.username, "User logged in");
            Ok(Redirect::to(safe_redirect_target(next)))
        }
        Err(AuthError::InvalidCredentials) => {
            push_flash(&session, "danger", "Invalid username or password").await;
            Ok(Redirect::to(&login_url(next)))
        }
        Err(e) => {
            error!(error = %e, "Login failed");
            push_flash(&session, "danger", "Login failed, please try again").await;
            Ok(Redirect::to(&login_url(next)))
        }
    }
}

/// GET /register
pub async fn register_page(session: Session) -> Response {
    if session_user(&session).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let flashes = take_flashes(&session).await;
    Html(pages::register(&flashes)).into_response()
}

/// POST /register
pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    let registration = Registration {
        username: form.username,
        email: form.email,
        password: form.password,
        password2: form.password2,
    };

    match state.shared.auth_service.register(&registration).await {
        Ok(user) => {
            info!(username = %user.username, "User registered");
            push_flash(&session, "success", "Registration successful, please log in").await;
            Redirect::to("/login")
        }
        Err(AuthError::Validation(errors)) => {
            for message in errors {
                push_flash(&session, "danger", message).await;
            }
            Redirect::to("/register")
        }
        Err(e) => {
            error!(error = %e, "Registration failed");
            push_flash(&session, "danger", "Registration failed, please try again").await;
            Redirect::to("/register")
        }
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Redirect {
    if let Some((_, username)) = session_user(&session).await {
        info!(username = %username, "User logged out");
    }
    if let Err(e) = session.flush().await {
        warn!(error = %e, "Failed to clear session");
    }

    push_flash(&session, "info", "You have been logged out").await;
    Redirect::to("/login")
}
