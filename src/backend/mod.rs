//! Cache backend abstraction and the in-memory reference backend.
//!
//! A backend is a dumb byte store: it knows nothing about namespaces, TTL
//! policy or fail-open behavior. Those live in [`crate::client::CacheClient`]
//! and the typed namespaces above it. Backends return `Result` and the client
//! decides what to do with failures.

use crate::error::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "redis")]
pub use redis::{RedisBackend, RedisConfig};

/// Uniform interface to a key-value store.
///
/// Implementations must serialize concurrent writes to the same key themselves
/// (the remote store does; the in-memory backend relies on dashmap's sharded
/// locking). Last write wins.
#[allow(async_fn_in_trait)]
pub trait CacheBackend: Send + Sync {
    /// Fetch raw bytes for a key. `None` on miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store bytes, with an expiring write when `ttl` is given.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Remove a single key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Batch fetch. The result preserves input order; misses are `None`.
    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Batch store of same-TTL entries in one logical operation.
    async fn mset(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> Result<()>;

    /// Batch remove.
    async fn mdelete(&self, keys: &[&str]) -> Result<()>;

    /// Enumerate keys matching a `*`-glob pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Atomically add `by` to the integer at `key` (0 when absent); returns
    /// the new value.
    async fn incr(&self, key: &str, by: i64) -> Result<i64>;

    /// True when the store answers a round trip.
    async fn health_check(&self) -> Result<bool>;
}

/// Match `text` against a glob `pattern` where `*` matches any run of
/// characters (including none). No other metacharacters.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            // Backtrack: let the last '*' swallow one more character.
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

struct StoredEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory backend over a sharded concurrent map.
///
/// TTL expiry is lazy: expired entries are dropped when touched by `get`,
/// `keys` or `incr`, matching the remote store's contract that this subsystem
/// never runs its own eviction sweep.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    entries: Arc<DashMap<String, StoredEntry>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        InMemoryBackend::default()
    }

    /// Number of live (non-expired) entries. Test helper.
    pub async fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .count()
    }

    fn expiry_for(ttl: Option<Duration>) -> Option<Instant> {
        ttl.map(|d| Instant::now() + d)
    }
}

impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            StoredEntry {
                data: value,
                expires_at: Self::expiry_for(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>> {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(self.get(key).await?);
        }
        Ok(results)
    }

    async fn mset(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value.clone(), ttl).await?;
        }
        Ok(())
    }

    async fn mdelete(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut matches = Vec::new();
        for entry in self.entries.iter() {
            if !entry.value().is_expired() && glob_match(pattern, entry.key()) {
                matches.push(entry.key().clone());
            }
        }
        Ok(matches)
    }

    async fn incr(&self, key: &str, by: i64) -> Result<i64> {
        let mut entry = self.entries.entry(key.to_string()).or_insert(StoredEntry {
            data: b"0".to_vec(),
            expires_at: None,
        });

        if entry.is_expired() {
            entry.data = b"0".to_vec();
            entry.expires_at = None;
        }

        let current: i64 = std::str::from_utf8(&entry.data)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                Error::BackendError(format!("INCR on non-integer value at key {}", key))
            })?;

        let next = current + by;
        entry.data = next.to_string().into_bytes();
        Ok(next)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("api:/foo*", "api:/foo?x=1"));
        assert!(glob_match("api:/foo*", "api:/foo"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("stats:*:total", "stats:hit:total"));
        assert!(!glob_match("api:/foo*", "api:/bar?x=1"));
        assert!(!glob_match("api:/foo", "api:/foo?x=1"));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let backend = InMemoryBackend::new();
        backend.set("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(b"v".to_vec()));

        backend.delete("k").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiry_is_lazy() {
        let backend = InMemoryBackend::new();
        backend
            .set("k", b"v".to_vec(), Some(Duration::from_millis(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert_eq!(backend.len().await, 0);
    }

    #[tokio::test]
    async fn test_mget_preserves_order() {
        let backend = InMemoryBackend::new();
        backend.set("a", b"1".to_vec(), None).await.unwrap();
        backend.set("c", b"3".to_vec(), None).await.unwrap();

        let got = backend.mget(&["a", "b", "c"]).await.unwrap();
        assert_eq!(
            got,
            vec![Some(b"1".to_vec()), None, Some(b"3".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_keys_pattern_skips_expired() {
        let backend = InMemoryBackend::new();
        backend.set("api:/foo?x=1", b"1".to_vec(), None).await.unwrap();
        backend
            .set("api:/foo?y=2", b"2".to_vec(), Some(Duration::from_millis(5)))
            .await
            .unwrap();
        backend.set("api:/bar", b"3".to_vec(), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(15)).await;
        let mut keys = backend.keys("api:/foo*").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["api:/foo?x=1".to_string()]);
    }

    #[tokio::test]
    async fn test_incr() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.incr("n", 1).await.unwrap(), 1);
        assert_eq!(backend.incr("n", 5).await.unwrap(), 6);

        backend.set("s", b"not a number".to_vec(), None).await.unwrap();
        assert!(backend.incr("s", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_mset_single_ttl_bucket() {
        let backend = InMemoryBackend::new();
        backend
            .mset(
                &[
                    ("a".to_string(), b"1".to_vec()),
                    ("b".to_string(), b"2".to_vec()),
                ],
                Some(Duration::from_secs(60)),
            )
            .await
            .unwrap();

        assert_eq!(backend.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(backend.get("b").await.unwrap(), Some(b"2".to_vec()));
    }
}
