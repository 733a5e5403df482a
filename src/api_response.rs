//! Generic API-response cache, keyed by path plus sorted query string.

use crate::backend::CacheBackend;
use crate::client::CacheClient;
use crate::keys;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Cache for rendered API responses.
///
/// One entry per `path` + parameter combination; parameter order never
/// matters because keys are derived from the sorted query string. Values are
/// generic per call since each path serves its own response shape.
#[derive(Clone)]
pub struct ApiResponseCache<B> {
    client: CacheClient<B>,
    ttl: Duration,
}

impl<B: CacheBackend> ApiResponseCache<B> {
    pub fn new(client: CacheClient<B>, ttl: Duration) -> Self {
        ApiResponseCache { client, ttl }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Option<T> {
        self.client.get(&keys::api_response_key(path, params)).await
    }

    pub async fn set<T: Serialize>(&self, path: &str, params: &[(&str, &str)], response: &T) {
        self.client
            .set(&keys::api_response_key(path, params), response, Some(self.ttl))
            .await;
    }

    /// Drop the entry for one exact path + parameter combination.
    pub async fn delete(&self, path: &str, params: &[(&str, &str)]) {
        self.client.del(&keys::api_response_key(path, params)).await;
    }

    /// Drop every cached response for a path, regardless of parameters.
    pub async fn delete_by_path(&self, path: &str) {
        self.client
            .del_by_pattern(&keys::api_response_pattern(path))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use serde_json::json;

    fn cache() -> ApiResponseCache<InMemoryBackend> {
        ApiResponseCache::new(
            CacheClient::new(InMemoryBackend::new()),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn test_param_order_does_not_matter() {
        let cache = cache();
        let body = json!({"items": [1, 2, 3]});

        cache.set("/feed", &[("b", "2"), ("a", "1")], &body).await;
        assert_eq!(
            cache
                .get::<serde_json::Value>("/feed", &[("a", "1"), ("b", "2")])
                .await,
            Some(body)
        );
    }

    #[tokio::test]
    async fn test_no_params_key() {
        let cache = cache();
        let body = json!({"ok": true});

        cache.set("/health", &[], &body).await;
        assert_eq!(cache.get::<serde_json::Value>("/health", &[]).await, Some(body));
    }

    #[tokio::test]
    async fn test_delete_single_combination() {
        let cache = cache();
        cache.set("/feed", &[("page", "1")], &json!(1)).await;
        cache.set("/feed", &[("page", "2")], &json!(2)).await;

        cache.delete("/feed", &[("page", "1")]).await;

        assert_eq!(cache.get::<serde_json::Value>("/feed", &[("page", "1")]).await, None);
        assert_eq!(
            cache.get::<serde_json::Value>("/feed", &[("page", "2")]).await,
            Some(json!(2))
        );
    }

    #[tokio::test]
    async fn test_delete_by_path_removes_all_params() {
        let cache = cache();
        cache.set("/foo", &[("x", "1")], &json!("a")).await;
        cache.set("/foo", &[("y", "2")], &json!("b")).await;
        cache.set("/bar", &[], &json!("keep")).await;

        cache.delete_by_path("/foo").await;

        assert_eq!(cache.get::<serde_json::Value>("/foo", &[("x", "1")]).await, None);
        assert_eq!(cache.get::<serde_json::Value>("/foo", &[("y", "2")]).await, None);
        assert_eq!(
            cache.get::<serde_json::Value>("/bar", &[]).await,
            Some(json!("keep"))
        );
    }
}
