//! Cached aggregate endpoints.

use axum::{
    extract::{RawQuery, State},
    response::Response,
};
use std::sync::Arc;

use super::AppState;

/// GET /api/overview_stats
pub async fn overview_stats(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Response {
    let catalog = &state.shared.catalog_service;
    state
        .cache
        .respond("overview_stats", query, catalog.overview_stats())
        .await
}

/// GET /api/brand_analysis
pub async fn brand_analysis(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Response {
    let catalog = &state.shared.catalog_service;
    state
        .cache
        .respond("brand_analysis", query, catalog.brand_analysis())
        .await
}

/// GET /api/ram_analysis
pub async fn ram_analysis(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Response {
    let catalog = &state.shared.catalog_service;
    state
        .cache
        .respond("ram_analysis", query, catalog.ram_analysis())
        .await
}

/// GET /api/cpu_analysis
pub async fn cpu_analysis(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Response {
    let catalog = &state.shared.catalog_service;
    state
        .cache
        .respond("cpu_analysis", query, catalog.cpu_analysis())
        .await
}

/// GET /api/price_range_analysis
pub async fn price_range_analysis(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let catalog = &state.shared.catalog_service;
    state
        .cache
        .respond("price_range_analysis", query, catalog.price_range_analysis())
        .await
}

/// GET /api/sales_analysis
pub async fn sales_analysis(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Response {
    let catalog = &state.shared.catalog_service;
    state
        .cache
        .respond("sales_analysis", query, catalog.sales_analysis())
        .await
}

/// GET /api/price_sales_correlation
pub async fn price_sales_correlation(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let catalog = &state.shared.catalog_service;
    state
        .cache
        .respond("price_sales_correlation", query, catalog.price_sales_correlation())
        .await
}
