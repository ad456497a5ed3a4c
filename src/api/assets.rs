use axum::{
    body::Body,
    extract::Path,
    http::header,
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

use super::ApiError;

#[derive(RustEmbed)]
#[folder = "static"]
struct Asset;

/// GET /static/{*path}
pub async fn serve_static(Path(path): Path<String>) -> Response {
    match Asset::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                Body::from(content.data),
            )
                .into_response()
        }
        None => ApiError::NotFound(format!("Asset {path} not found")).into_response(),
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
