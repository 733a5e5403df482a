//! On-demand page revalidation.
//!
//! When profile data changes, the server-rendered page for `/<username>` is
//! regenerated through the hosting platform's revalidation endpoint. The
//! pipeline talks to the trait so tests (and unconfigured deployments) can
//! swap the HTTP implementation out.

use crate::config::RevalidateConfig;
use crate::error::{Error, Result};

/// Requests regeneration of a statically-cached rendered page.
#[allow(async_fn_in_trait)]
pub trait PageRevalidator: Send + Sync {
    async fn revalidate(&self, path: &str) -> Result<()>;
}

/// Revalidator that calls `POST <base>/api/revalidate?path=<url-encoded>`.
///
/// Sends `Authorization: Bearer <token>` when a token is configured, an empty
/// body, and `Cache-Control: no-cache` so no intermediary caches the
/// revalidation call itself.
pub struct HttpPageRevalidator {
    http: reqwest::Client,
    config: RevalidateConfig,
}

impl HttpPageRevalidator {
    /// # Errors
    /// Returns `Err` if the HTTP client cannot be built.
    pub fn new(config: RevalidateConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(HttpPageRevalidator { http, config })
    }
}

impl PageRevalidator for HttpPageRevalidator {
    async fn revalidate(&self, path: &str) -> Result<()> {
        let url = format!(
            "{}/api/revalidate",
            self.config.base_url.trim_end_matches('/')
        );

        let mut request = self
            .http
            .post(&url)
            .query(&[("path", path)])
            .header(reqwest::header::CACHE_CONTROL, "no-cache");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "revalidation for {} returned {}",
                path,
                response.status()
            )));
        }

        debug!("✓ Revalidated page {}", path);
        Ok(())
    }
}

/// Revalidator for deployments without a revalidation endpoint; logs and
/// succeeds.
pub struct NoopPageRevalidator;

impl PageRevalidator for NoopPageRevalidator {
    async fn revalidate(&self, path: &str) -> Result<()> {
        debug!("Revalidation not configured, skipping {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_revalidate_posts_path_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/revalidate"))
            .and(query_param("path", "/bob"))
            .and(header("authorization", "Bearer reval-token"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let revalidator =
            HttpPageRevalidator::new(RevalidateConfig::new(server.uri()).with_token("reval-token"))
                .unwrap();

        revalidator.revalidate("/bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_revalidate_without_token_omits_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/revalidate"))
            .and(query_param("path", "/alice"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let revalidator = HttpPageRevalidator::new(RevalidateConfig::new(server.uri())).unwrap();
        revalidator.revalidate("/alice").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_non_2xx_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/revalidate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let revalidator = HttpPageRevalidator::new(RevalidateConfig::new(server.uri())).unwrap();
        let err = revalidator.revalidate("/bob").await.unwrap_err();
        assert!(matches!(err, Error::HttpError(_)));
    }

    #[tokio::test]
    async fn test_noop_always_succeeds() {
        NoopPageRevalidator.revalidate("/anything").await.unwrap();
    }
}
