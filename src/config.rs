//! Configuration for the caching subsystem.
//!
//! All knobs are plain structs handed to constructors at the composition root.
//! TTLs are injected here rather than compiled into the namespaces so that
//! per-environment tuning does not require a rebuild. Each struct has a
//! `from_env` reading the recognized environment variables; absence of the
//! optional services (store, edge purge) disables them rather than erroring.

use std::time::Duration;

/// Per-namespace time-to-live policy.
#[derive(Clone, Debug)]
pub struct TtlConfig {
    /// Profile-by-username entries.
    pub profile: Duration,
    /// Social-link lists keyed by profile id.
    pub social_links: Duration,
    /// The ordered popular-profiles list.
    pub popular_profiles: Duration,
    /// Generic API-response entries.
    pub api_response: Duration,
}

impl Default for TtlConfig {
    fn default() -> Self {
        TtlConfig {
            profile: Duration::from_secs(3600),
            social_links: Duration::from_secs(3600),
            popular_profiles: Duration::from_secs(86400),
            api_response: Duration::from_secs(300),
        }
    }
}

/// Connection settings for the remote key-value store.
///
/// A missing URL means "no store": the client built from this config reports
/// `is_enabled() == false` and every operation no-ops.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Per-operation timeout applied by `CacheClient`; an elapsed timeout is
    /// treated like any other store error (logged, fail-open).
    pub op_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            url: None,
            token: None,
            op_timeout: Duration::from_secs(2),
        }
    }
}

impl StoreConfig {
    /// Read `CACHE_STORE_URL` and `CACHE_STORE_TOKEN`.
    pub fn from_env() -> Self {
        StoreConfig {
            url: std::env::var("CACHE_STORE_URL").ok(),
            token: std::env::var("CACHE_STORE_TOKEN").ok(),
            ..Default::default()
        }
    }

    /// True when connection credentials are present.
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// Settings for the on-demand page revalidation endpoint.
#[derive(Clone, Debug)]
pub struct RevalidateConfig {
    /// Base URL of the hosting platform, e.g. `https://biolink.example`.
    pub base_url: String,
    /// Bearer token; omitted from the request when absent.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl RevalidateConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        RevalidateConfig {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(4),
        }
    }

    /// Read `REVALIDATE_BASE_URL` and `REVALIDATE_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("REVALIDATE_BASE_URL").ok()?;
        let mut config = RevalidateConfig::new(base_url);
        config.token = std::env::var("REVALIDATE_TOKEN").ok();
        Some(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Settings for the CDN purge endpoint.
///
/// All four values gate whether the purge step runs at all; `from_env` returns
/// `None` when any is missing and the pipeline logs the skip per call.
#[derive(Clone, Debug)]
pub struct EdgeConfig {
    /// Provider API base, e.g. `https://api.cdn.example`.
    pub base_url: String,
    pub project_id: String,
    pub domain: String,
    pub purge_token: String,
    pub timeout: Duration,
}

impl EdgeConfig {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        domain: impl Into<String>,
        purge_token: impl Into<String>,
    ) -> Self {
        EdgeConfig {
            base_url: base_url.into(),
            project_id: project_id.into(),
            domain: domain.into(),
            purge_token: purge_token.into(),
            timeout: Duration::from_secs(4),
        }
    }

    /// Read `EDGE_API_URL`, `EDGE_PROJECT_ID`, `EDGE_DOMAIN` and
    /// `EDGE_PURGE_TOKEN`; `None` unless all four are set.
    pub fn from_env() -> Option<Self> {
        Some(EdgeConfig::new(
            std::env::var("EDGE_API_URL").ok()?,
            std::env::var("EDGE_PROJECT_ID").ok()?,
            std::env::var("EDGE_DOMAIN").ok()?,
            std::env::var("EDGE_PURGE_TOKEN").ok()?,
        ))
    }
}
