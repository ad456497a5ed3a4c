//! Short-lived cache of serialized aggregate responses.

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{ApiError, ApiResponse};

type CacheKey = (&'static str, String);

struct CachedBody {
    body: String,
    expires_at: Instant,
}

/// Serialized JSON bodies keyed by handler name and raw query string.
///
/// Entries expire after a fixed TTL. Expired entries are dropped whenever a
/// new body is stored, and once `max_entries` is reached the entry closest
/// to expiry is evicted.
pub struct ResponseCache {
    ttl: Duration,
    max_entries: usize,
    entries: RwLock<HashMap<CacheKey, CachedBody>>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, handler: &'static str, query: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(&(handler, query.to_string()))
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| cached.body.clone())
    }

    pub async fn insert(&self, handler: &'static str, query: String, body: String) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.retain(|_, cached| cached.expires_at > now);

        let key = (handler, query);
        if entries.len() >= self.max_entries
            && !entries.contains_key(&key)
            && let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, cached)| cached.expires_at)
                .map(|(key, _)| key.clone())
        {
            entries.remove(&oldest);
        }

        entries.insert(
            key,
            CachedBody {
                body,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Serve a fresh cached body, or await `compute` and wrap it in the
    /// envelope. Only successful envelopes are stored.
    pub async fn respond<T, E>(
        &self,
        handler: &'static str,
        query: Option<String>,
        compute: impl Future<Output = Result<T, E>>,
    ) -> Response
    where
        T: Serialize,
        E: Display,
    {
        let query = query.unwrap_or_default();
        if let Some(body) = self.get(handler, &query).await {
            metrics::counter!("response_cache_hits_total", "handler" => handler).increment(1);
            return json_body(body);
        }

        let envelope = ApiResponse::from_result(compute.await);
        match serde_json::to_string(&envelope) {
            Ok(body) => {
                if envelope.success {
                    self.insert(handler, query, body.clone()).await;
                }
                json_body(body)
            }
            Err(e) => ApiError::internal(format!("Failed to serialize response: {e}")).into_response(),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn json_body(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}
