use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::validation::validate_limit;
use super::{ApiError, ApiResponse, AppState, CommentsQuery, DataQuery, PagedResponse};
use crate::models::{LaptopFilter, Page};
use crate::services::catalog_service::{BrandRamOption, CommentPage};

const DEFAULT_COMMENT_LIMIT: u64 = 10;

/// GET /api/data
pub async fn list_data(State(state): State<Arc<AppState>>, Query(query): Query<DataQuery>) -> Response {
    let filter = LaptopFilter {
        brand: query.brand,
        cpu: query.cpu,
        ram: None,
        ram_gb_min: query.ram_gb_min,
        ram_gb_max: query.ram_gb_max,
        price_min: query.price_min,
        price_max: query.price_max,
    };
    if let Some(size) = query.page_size
        && let Err(e) = validate_limit(size)
    {
        return e.into_response();
    }

    let page = Page {
        page: query.page,
        page_size: query.page_size,
    };
    if page.is_out_of_range() {
        return Json(ApiResponse::<()>::error(format!(
            "Page {} is out of range",
            query.page.unwrap_or_default()
        )))
        .into_response();
    }

    match state.shared.catalog_service.list_laptops(&filter, page).await {
        Ok(result) => Json(PagedResponse {
            success: true,
            data: result.items,
            total: result.total,
            page: query.page,
            page_size: query.page_size,
        })
        .into_response(),
        Err(e) => Json(ApiResponse::<()>::from_result(Err(e))).into_response(),
    }
}

/// GET /api/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<ApiResponse<CommentPage>>, ApiError> {
    let limit = validate_limit(query.limit.unwrap_or(DEFAULT_COMMENT_LIMIT))?;
    let laptop_id = query.laptop_id.filter(|id| *id > 0);
    let offset = query.offset.unwrap_or(0);

    let result = state
        .shared
        .catalog_service
        .comments(laptop_id, limit, offset)
        .await;
    Ok(Json(ApiResponse::from_result(result)))
}

/// GET /api/brand_ram_options
pub async fn brand_ram_options(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<BrandRamOption>>> {
    Json(ApiResponse::from_result(
        state.shared.catalog_service.brand_ram_options().await,
    ))
}
