//! Fail-open client over a cache backend.
//!
//! This is the only place failure policy lives: every operation catches, logs
//! and absorbs backend errors so that the layers above can treat caching as a
//! pure optimization, never a correctness dependency. A cache outage must not
//! become an application outage.
//!
//! The client is constructed once at the composition root and handed (cloned)
//! to each typed namespace; there is no global instance.

use crate::backend::CacheBackend;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Fail-open wrapper around a [`CacheBackend`].
///
/// Holds `Option<B>`: a client built with [`CacheClient::disabled`] (or from a
/// config with no store URL) reports `is_enabled() == false` and every
/// operation behaves as a permanent miss/no-op.
#[derive(Clone)]
pub struct CacheClient<B> {
    backend: Option<B>,
    op_timeout: Duration,
}

impl<B> CacheClient<B> {
    /// A permanently disabled client. All reads miss, all writes no-op.
    pub fn disabled() -> Self {
        CacheClient {
            backend: None,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// True only when a backend was supplied at construction.
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }
}

impl<B: CacheBackend> CacheClient<B> {
    pub fn new(backend: B) -> Self {
        CacheClient {
            backend: Some(backend),
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Override the per-operation timeout (default 2s). A timed-out call is
    /// logged and treated like any other backend failure.
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Run one backend call under the timeout, absorbing every failure.
    async fn run<T, F>(&self, op: &str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("✗ Cache {} {} failed: {}", op, key, e);
                None
            }
            Err(_) => {
                warn!(
                    "✗ Cache {} {} timed out after {:?}",
                    op, key, self.op_timeout
                );
                None
            }
        }
    }

    /// Read and decode one entry. Store errors and undecodable entries are
    /// logged and surface as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;
        let bytes = self.run("GET", key, backend.get(key)).await??;

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("✗ Cache GET {}: dropping undecodable entry: {}", key, e);
                None
            }
        }
    }

    /// Encode and store one entry; expiring write when `ttl` is given.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("✗ Cache SET {}: serialization failed: {}", key, e);
                return;
            }
        };

        self.run("SET", key, backend.set(key, bytes, ttl)).await;
    }

    /// Remove one entry.
    pub async fn del(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        self.run("DEL", key, backend.delete(key)).await;
    }

    /// Remove every key matching a `*`-glob pattern: enumerate first, then
    /// delete the matches in one batch. No-op on zero matches.
    pub async fn del_by_pattern(&self, pattern: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        let Some(keys) = self.run("KEYS", pattern, backend.keys(pattern)).await else {
            return;
        };
        if keys.is_empty() {
            debug!("Cache DEL_BY_PATTERN {}: no matches", pattern);
            return;
        }

        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        if self
            .run("DEL_BY_PATTERN", pattern, backend.mdelete(&refs))
            .await
            .is_some()
        {
            debug!("✓ Cache DEL_BY_PATTERN {} removed {} keys", pattern, keys.len());
        }
    }

    /// Batch read. The result preserves input key order; misses (and any
    /// failure, which blankets the whole batch) map to `None`.
    pub async fn mget<T: DeserializeOwned>(&self, keys: &[&str]) -> Vec<(String, Option<T>)> {
        let all_misses = || {
            keys.iter()
                .map(|k| (k.to_string(), None))
                .collect::<Vec<_>>()
        };

        let Some(backend) = self.backend.as_ref() else {
            return all_misses();
        };
        if keys.is_empty() {
            return Vec::new();
        }

        let Some(values) = self.run("MGET", "(batch)", backend.mget(keys)).await else {
            return all_misses();
        };

        keys.iter()
            .zip(values)
            .map(|(key, bytes)| {
                let decoded = bytes.and_then(|b| match serde_json::from_slice(&b) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!("✗ Cache MGET {}: dropping undecodable entry: {}", key, e);
                        None
                    }
                });
                (key.to_string(), decoded)
            })
            .collect()
    }

    /// Batch write. Entries are grouped by TTL bucket (including a no-TTL
    /// bucket) so that same-TTL entries go to the store in one batched call.
    pub async fn mset<T: Serialize>(&self, entries: &[(String, T, Option<Duration>)]) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if entries.is_empty() {
            return;
        }

        let mut buckets: HashMap<Option<Duration>, Vec<(String, Vec<u8>)>> = HashMap::new();
        for (key, value, ttl) in entries {
            match serde_json::to_vec(value) {
                Ok(bytes) => buckets
                    .entry(*ttl)
                    .or_default()
                    .push((key.clone(), bytes)),
                Err(e) => {
                    warn!("✗ Cache MSET {}: serialization failed, skipping: {}", key, e);
                }
            }
        }

        for (ttl, bucket) in buckets {
            self.run("MSET", "(batch)", backend.mset(&bucket, ttl)).await;
        }
    }

    /// Atomic increment; returns the new value, or 0 when disabled or erroring.
    pub async fn incr(&self, key: &str, by: i64) -> i64 {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };
        self.run("INCR", key, backend.incr(key, by))
            .await
            .unwrap_or(0)
    }
}
