//! Shared HTTP client for museum APIs

use super::Museum;
use crate::cache::{keys, NoCache, ResponseCache};
use crate::errors::{AppError, Result};
use crate::metrics;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// reqwest client plus the TTL response cache every JSON source goes through
#[derive(Clone)]
pub struct MuseumClient {
    http: reqwest::Client,
    cache: Arc<dyn ResponseCache>,
    ttl: Duration,
    key_prefix: String,
}

impl MuseumClient {
    pub fn new(
        timeout: Duration,
        cache: Arc<dyn ResponseCache>,
        ttl: Duration,
        key_prefix: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("artstuff/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            cache,
            ttl,
            key_prefix: key_prefix.into(),
        })
    }

    /// Client without a response cache (tests, one-off lookups)
    pub fn uncached(timeout: Duration) -> Result<Self> {
        Self::new(timeout, Arc::new(NoCache), Duration::ZERO, "artstuff")
    }

    /// GET a JSON document, answering from the cache while it is fresh
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        museum: Museum,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.get_json_optional(museum, url, params)
            .await?
            .ok_or_else(|| AppError::Upstream {
                museum: museum.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
    }

    /// Like [`get_json`](Self::get_json), but a 404 is `Ok(None)`
    pub async fn get_json_optional<T: DeserializeOwned>(
        &self,
        museum: Museum,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        let key = keys::museum_response(&self.key_prefix, museum.as_str(), url, params);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                metrics::record_cache(true, self.cache.name());
                return serde_json::from_value(cached)
                    .map(Some)
                    .map_err(|e| shape_error(museum, e));
            }
            Ok(None) => metrics::record_cache(false, self.cache.name()),
            Err(e) => warn!(museum = %museum, error = %e, "Response cache read failed"),
        }

        let Some(body) = self.fetch(museum, url, params).await? else {
            return Ok(None);
        };
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| shape_error(museum, e))?;

        if !self.ttl.is_zero() {
            if let Err(e) = self.cache.put(&key, &value, self.ttl).await {
                warn!(museum = %museum, error = %e, "Failed to cache museum response, continuing without cache");
            }
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| shape_error(museum, e))
    }

    /// GET a raw body (OAI-PMH XML), never cached
    pub async fn get_text(&self, museum: Museum, url: &str, params: &[(&str, String)]) -> Result<String> {
        self.fetch(museum, url, params)
            .await?
            .ok_or_else(|| AppError::Upstream {
                museum: museum.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
    }

    /// Body of a successful response, `None` on 404
    async fn fetch(&self, museum: Museum, url: &str, params: &[(&str, String)]) -> Result<Option<String>> {
        let start = Instant::now();
        let result = self.send(museum, url, params).await;
        metrics::record_museum_request(museum.as_str(), start.elapsed().as_secs_f64(), result.is_ok());
        result
    }

    async fn send(&self, museum: Museum, url: &str, params: &[(&str, String)]) -> Result<Option<String>> {
        debug!(museum = %museum, url = %url, "Museum API request");

        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                museum: museum.to_string(),
                message: format!("Request failed: {}", e),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Upstream {
                museum: museum.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.text().await.map(Some).map_err(|e| AppError::Upstream {
            museum: museum.to_string(),
            message: format!("Failed to read response: {}", e),
        })
    }
}

fn shape_error(museum: Museum, e: serde_json::Error) -> AppError {
    AppError::Upstream {
        museum: museum.to_string(),
        message: format!("Unexpected response shape: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_json_uses_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/things")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "monet".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"ok": true}).to_string())
            .expect(1)
            .create_async()
            .await;

        let cache = Arc::new(MemoryCache::default());
        let client =
            MuseumClient::new(Duration::from_secs(5), cache, Duration::from_secs(60), "test").unwrap();
        let url = format!("{}/things", server.url());
        let params = [("q", "monet".to_string())];

        let first: serde_json::Value = client.get_json(Museum::Aic, &url, &params).await.unwrap();
        let second: serde_json::Value = client.get_json(Museum::Aic, &url, &params).await.unwrap();

        assert_eq!(first, json!({"ok": true}));
        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/broken")
            .with_status(503)
            .create_async()
            .await;

        let client = MuseumClient::uncached(Duration::from_secs(5)).unwrap();
        let url = format!("{}/broken", server.url());
        let result: Result<serde_json::Value> = client.get_json(Museum::Met, &url, &[]).await;

        match result {
            Err(AppError::Upstream { museum, message }) => {
                assert_eq!(museum, "met");
                assert!(message.contains("503"));
            }
            other => panic!("expected upstream error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/objects/1")
            .with_status(404)
            .create_async()
            .await;

        let client = MuseumClient::uncached(Duration::from_secs(5)).unwrap();
        let url = format!("{}/objects/1", server.url());
        let found: Option<serde_json::Value> =
            client.get_json_optional(Museum::Met, &url, &[]).await.unwrap();
        assert!(found.is_none());

        let strict: Result<serde_json::Value> = client.get_json(Museum::Met, &url, &[]).await;
        assert!(matches!(strict, Err(AppError::Upstream { .. })));
    }
}
