//! Cache key derivation.
//!
//! Every namespace owns a `prefix:identifier` key scheme. The derivation rules
//! here are load-bearing: pre-existing cache contents use these exact strings,
//! so changing them orphans every entry already in the store.
//!
//! Invariants:
//! - usernames are lower-cased before keying, so `Alice` and `alice` share one
//!   entry;
//! - API-response query parameters are sorted by key name ascending before
//!   joining, so equivalent requests map to the same key regardless of
//!   parameter order.

use std::fmt;

/// Namespace prefix for profile entries, keyed by lower-cased username.
pub const PROFILE_PREFIX: &str = "profile";

/// Namespace prefix for social-link lists, keyed by profile id.
pub const SOCIAL_LINKS_PREFIX: &str = "social_links";

/// Namespace prefix for the `profile id -> username` secondary index.
pub const PROFILE_INDEX_PREFIX: &str = "profile_id";

/// Namespace prefix for cached API responses.
pub const API_PREFIX: &str = "api";

/// The single key under which the ordered popular-profiles list lives.
pub const POPULAR_PROFILES_KEY: &str = "popular_profiles";

/// Build the profile cache key for a username.
pub fn profile_key(username: &str) -> String {
    format!("{}:{}", PROFILE_PREFIX, username.to_lowercase())
}

/// Recover the (lower-cased) username from a profile cache key.
///
/// Returns `None` for keys outside the profile namespace.
pub fn username_from_profile_key(key: &str) -> Option<&str> {
    key.strip_prefix(PROFILE_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
}

/// Build the social-links cache key for a profile id.
pub fn social_links_key(profile_id: &str) -> String {
    format!("{}:{}", SOCIAL_LINKS_PREFIX, profile_id)
}

/// Build the secondary-index key mapping a profile id back to its username.
pub fn profile_index_key(profile_id: &str) -> String {
    format!("{}:{}", PROFILE_INDEX_PREFIX, profile_id)
}

/// Build the cache key for an API response.
///
/// Parameters are sorted by key name ascending and joined as `key=value` pairs
/// with `&`. With no parameters the key is exactly `api:<path>`.
pub fn api_response_key(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return format!("{}:{}", API_PREFIX, path);
    }

    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let query = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}:{}?{}", API_PREFIX, path, query)
}

/// Glob pattern matching every cached API response for a path, any parameters.
pub fn api_response_pattern(path: &str) -> String {
    format!("{}:{}*", API_PREFIX, path)
}

/// The cache layer a hit/miss counter is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLayer {
    /// CDN in front of everything.
    Edge,
    /// Server-rendered page cache.
    App,
    /// The remote key-value store itself.
    Store,
}

impl CacheLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheLayer::Edge => "edge",
            CacheLayer::App => "app",
            CacheLayer::Store => "store",
        }
    }
}

impl fmt::Display for CacheLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counter key for hits on `(layer, key)`. `key` may be `"total"`.
pub fn hit_key(layer: CacheLayer, key: &str) -> String {
    format!("stats:hit:{}:{}", layer, key)
}

/// Counter key for misses on `(layer, key)`. `key` may be `"total"`.
pub fn miss_key(layer: CacheLayer, key: &str) -> String {
    format!("stats:miss:{}:{}", layer, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_profile_key_lowercases() {
        assert_eq!(profile_key("Alice"), "profile:alice");
        assert_eq!(profile_key("alice"), "profile:alice");
    }

    #[test]
    fn test_username_round_trip() {
        let key = profile_key("Bob");
        assert_eq!(username_from_profile_key(&key), Some("bob"));
        assert_eq!(username_from_profile_key("social_links:p1"), None);
        assert_eq!(username_from_profile_key("profilex"), None);
    }

    #[test]
    fn test_api_key_sorts_params() {
        let a = api_response_key("/foo", &[("b", "2"), ("a", "1")]);
        let b = api_response_key("/foo", &[("a", "1"), ("b", "2")]);
        assert_eq!(a, b);
        assert_eq!(a, "api:/foo?a=1&b=2");
    }

    #[test]
    fn test_api_key_no_params() {
        assert_eq!(api_response_key("/foo", &[]), "api:/foo");
    }

    #[test]
    fn test_api_pattern() {
        assert_eq!(api_response_pattern("/foo"), "api:/foo*");
    }

    #[test]
    fn test_stat_keys() {
        assert_eq!(hit_key(CacheLayer::Store, "total"), "stats:hit:store:total");
        assert_eq!(miss_key(CacheLayer::Edge, "profile:bob"), "stats:miss:edge:profile:bob");
        assert_eq!(CacheLayer::App.as_str(), "app");
    }

    proptest! {
        #[test]
        fn prop_api_key_order_independent(
            path in "/[a-z]{1,8}",
            params in proptest::collection::hash_map("[a-z]{1,5}", "[a-z0-9]{1,5}", 0..6),
        ) {
            let forward: Vec<(&str, &str)> =
                params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let mut reversed = forward.clone();
            reversed.reverse();

            prop_assert_eq!(
                api_response_key(&path, &forward),
                api_response_key(&path, &reversed)
            );
        }

        #[test]
        fn prop_profile_key_case_insensitive(username in "[a-zA-Z0-9]{1,12}") {
            prop_assert_eq!(
                profile_key(&username),
                profile_key(&username.to_uppercase())
            );
        }
    }
}
