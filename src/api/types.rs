use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::models::Laptop;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Service failures are reported in the body, never through the status code.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => {
                tracing::warn!(error = %e, "Request failed");
                Self::error(e.to_string())
            }
        }
    }
}

/// Envelope of the listing endpoint, which reports paging next to the rows.
#[derive(Debug, Serialize)]
pub struct PagedResponse {
    pub success: bool,
    pub data: Vec<Laptop>,
    pub total: u64,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Query-string value that is treated as absent when empty or unparseable.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cpu: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ram_gb_min: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub ram_gb_max: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub price_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub price_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub page_size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BrandQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceTrendQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ram: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub laptop_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(query: &str) -> T {
        let uri: axum::http::Uri = format!("/?{query}").parse().unwrap();
        axum::extract::Query::<T>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_lenient_query_values() {
        let q: DataQuery = parse("brand=&cpu=i7&ram_gb_min=abc&price_max=5000.5&page=2&page_size=");
        assert_eq!(q.brand, None);
        assert_eq!(q.cpu.as_deref(), Some("i7"));
        assert_eq!(q.ram_gb_min, None);
        assert_eq!(q.price_max, Some(5000.5));
        assert_eq!(q.page, Some(2));
        assert_eq!(q.page_size, None);
    }

    #[test]
    fn test_negative_limit_is_absent() {
        let q: CommentsQuery = parse("laptop_id=3&limit=-5");
        assert_eq!(q.laptop_id, Some(3));
        assert_eq!(q.limit, None);
        assert_eq!(q.offset, None);
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error("boom")).unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "message": "boom"}));
    }
}
