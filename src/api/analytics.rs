use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::{ApiResponse, AppState, BrandQuery, PriceTrendQuery};
use crate::analysis::clustering::ClusterReport;
use crate::analysis::competitive::CompetitiveAnalysis;
use crate::analysis::forecast::PriceTrendReport;
use crate::analysis::sentiment::SentimentReport;

/// GET /api/competitive_analysis
pub async fn competitive_analysis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BrandQuery>,
) -> Json<ApiResponse<CompetitiveAnalysis>> {
    let result = state
        .shared
        .analytics_service
        .competitive_analysis(query.brand.as_deref())
        .await;
    Json(ApiResponse::from_result(result))
}

/// GET /api/price_trend_prediction
pub async fn price_trend_prediction(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceTrendQuery>,
) -> Json<ApiResponse<PriceTrendReport>> {
    let result = state
        .shared
        .analytics_service
        .price_trend_prediction(query.brand.as_deref(), query.ram.as_deref(), query.days)
        .await;
    Json(ApiResponse::from_result(result))
}

/// GET /api/sentiment_analysis
pub async fn sentiment_analysis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BrandQuery>,
) -> Json<ApiResponse<SentimentReport>> {
    let result = state
        .shared
        .analytics_service
        .sentiment_analysis(query.brand.as_deref())
        .await;
    Json(ApiResponse::from_result(result))
}

/// GET /api/laptop_clustering
pub async fn laptop_clustering(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<ClusterReport>> {
    Json(ApiResponse::from_result(
        state.shared.analytics_service.laptop_clustering().await,
    ))
}
