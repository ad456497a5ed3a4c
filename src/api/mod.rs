use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::config::Config;
use crate::state::SharedState;

mod analytics;
mod assets;
pub mod auth;
mod cache;
mod catalog;
mod error;
mod observability;
mod pages;
mod stats;
mod types;
mod validation;

pub use cache::ResponseCache;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub cache: Arc<ResponseCache>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let cache_config = shared.config.read().await.cache.clone();
    let cache = Arc::new(ResponseCache::new(
        Duration::from_secs(cache_config.ttl_seconds),
        cache_config.max_entries,
    ));

    Arc::new(AppState {
        shared,
        cache,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle).await)
}

pub async fn router(state: Arc<AppState>) -> Router {
    let server = state.config().read().await.server.clone();

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(auth::dashboard))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route(
            "/register",
            get(auth::register_page).post(auth::register_submit),
        )
        .route("/logout", get(auth::logout))
        .route("/static/{*path}", get(assets::serve_static))
        .nest("/api", create_protected_router(state.clone()))
        .fallback(assets::not_found)
        .layer(session_layer)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/data", get(catalog::list_data))
        .route("/overview_stats", get(stats::overview_stats))
        .route("/brand_analysis", get(stats::brand_analysis))
        .route("/ram_analysis", get(stats::ram_analysis))
        .route("/cpu_analysis", get(stats::cpu_analysis))
        .route("/price_range_analysis", get(stats::price_range_analysis))
        .route("/sales_analysis", get(stats::sales_analysis))
        .route(
            "/price_sales_correlation",
            get(stats::price_sales_correlation),
        )
        .route(
            "/competitive_analysis",
            get(analytics::competitive_analysis),
        )
        .route(
            "/price_trend_prediction",
            get(analytics::price_trend_prediction),
        )
        .route("/sentiment_analysis", get(analytics::sentiment_analysis))
        .route("/laptop_clustering", get(analytics::laptop_clustering))
        .route("/brand_ram_options", get(catalog::brand_ram_options))
        .route("/comments", get(catalog::list_comments))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
