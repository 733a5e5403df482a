//! Edge/CDN cache purge.

use crate::config::EdgeConfig;
use crate::error::{Error, Result};
use serde_json::json;

/// Evicts a cached response for a path from the CDN before its normal expiry.
#[allow(async_fn_in_trait)]
pub trait EdgePurger: Send + Sync {
    /// Whether purge credentials are present. The invalidation pipeline skips
    /// the purge step (with a log line) when this is false.
    fn is_configured(&self) -> bool;

    async fn purge(&self, path: &str) -> Result<()>;
}

/// Purger that calls the provider's
/// `POST /v1/projects/<project>/domains/<domain>/purge-cache` endpoint with a
/// bearer token and a JSON body of `{"paths": [<path>]}`.
pub struct HttpEdgePurger {
    http: reqwest::Client,
    config: EdgeConfig,
}

impl HttpEdgePurger {
    /// # Errors
    /// Returns `Err` if the HTTP client cannot be built.
    pub fn new(config: EdgeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(HttpEdgePurger { http, config })
    }
}

impl EdgePurger for HttpEdgePurger {
    fn is_configured(&self) -> bool {
        true
    }

    async fn purge(&self, path: &str) -> Result<()> {
        let url = format!(
            "{}/v1/projects/{}/domains/{}/purge-cache",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.domain
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.purge_token)
            .json(&json!({ "paths": [path] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "edge purge for {} returned {}",
                path,
                response.status()
            )));
        }

        debug!("✓ Purged edge cache for {}", path);
        Ok(())
    }
}

/// Purger used when no purge credentials are configured. Reports itself
/// unconfigured; `purge` is never reached by the pipeline but succeeds anyway.
pub struct DisabledEdgePurger;

impl EdgePurger for DisabledEdgePurger {
    fn is_configured(&self) -> bool {
        false
    }

    async fn purge(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_purge_posts_paths_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/proj_1/domains/biolink.example/purge-cache"))
            .and(header("authorization", "Bearer purge-token"))
            .and(body_json(json!({ "paths": ["/bob"] })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let purger = HttpEdgePurger::new(EdgeConfig::new(
            server.uri(),
            "proj_1",
            "biolink.example",
            "purge-token",
        ))
        .unwrap();

        assert!(purger.is_configured());
        purger.purge("/bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_non_2xx_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let purger = HttpEdgePurger::new(EdgeConfig::new(
            server.uri(),
            "proj_1",
            "biolink.example",
            "bad-token",
        ))
        .unwrap();

        let err = purger.purge("/bob").await.unwrap_err();
        assert!(matches!(err, Error::HttpError(_)));
    }

    #[tokio::test]
    async fn test_disabled_purger() {
        assert!(!DisabledEdgePurger.is_configured());
        DisabledEdgePurger.purge("/bob").await.unwrap();
    }
}
