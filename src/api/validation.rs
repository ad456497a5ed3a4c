use super::ApiError;

pub const MAX_PAGE_LIMIT: u64 = 1000;

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    if limit > MAX_PAGE_LIMIT {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be at most {MAX_PAGE_LIMIT}"
        )));
    }
    Ok(limit)
}

/// Post-login redirect target. Only local absolute paths are honoured.
#[must_use]
pub fn safe_redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(0).is_ok());
        assert!(validate_limit(10).is_ok());
        assert!(validate_limit(1000).is_ok());
        assert!(validate_limit(1001).is_err());
    }

    #[test]
    fn test_safe_redirect_target() {
        assert_eq!(safe_redirect_target(Some("/api/data?page=2")), "/api/data?page=2");
        assert_eq!(safe_redirect_target(Some("https://evil.example")), "/");
        assert_eq!(safe_redirect_target(Some("//evil.example")), "/");
        assert_eq!(safe_redirect_target(Some("/\\evil.example")), "/");
        assert_eq!(safe_redirect_target(None), "/");
    }
}
