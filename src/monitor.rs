//! Hit/miss counters per cache layer.
//!
//! Counters live in the store itself (`stats:hit:<layer>:<key>`), written
//! through the fail-open client's `incr`, so a store outage silently pauses
//! stats instead of breaking callers. Every per-key increment also bumps the
//! layer's `:total` aggregate; `hit_rate` reads only the aggregates.

use crate::backend::CacheBackend;
use crate::client::CacheClient;
use crate::keys::{hit_key, miss_key, CacheLayer};

/// Key suffix for the per-layer aggregate counters.
const TOTAL: &str = "total";

/// Tracks cache effectiveness per layer.
#[derive(Clone)]
pub struct CacheMonitor<B> {
    client: CacheClient<B>,
}

impl<B: CacheBackend> CacheMonitor<B> {
    pub fn new(client: CacheClient<B>) -> Self {
        CacheMonitor { client }
    }

    /// Record a hit for `key` on `layer`; bumps the per-key counter and the
    /// layer total.
    pub async fn track_hit(&self, layer: CacheLayer, key: &str) {
        self.client.incr(&hit_key(layer, key), 1).await;
        self.client.incr(&hit_key(layer, TOTAL), 1).await;
    }

    /// Record a miss for `key` on `layer`; bumps the per-key counter and the
    /// layer total.
    pub async fn track_miss(&self, layer: CacheLayer, key: &str) {
        self.client.incr(&miss_key(layer, key), 1).await;
        self.client.incr(&miss_key(layer, TOTAL), 1).await;
    }

    /// Hit rate for a layer as a percentage, from the `:total` aggregates.
    ///
    /// `None` when no data has been recorded yet (both totals zero), which is
    /// distinct from a measured 0% rate.
    pub async fn hit_rate(&self, layer: CacheLayer) -> Option<f64> {
        let hits: i64 = self.client.get(&hit_key(layer, TOTAL)).await.unwrap_or(0);
        let misses: i64 = self.client.get(&miss_key(layer, TOTAL)).await.unwrap_or(0);

        if hits + misses == 0 {
            return None;
        }
        Some(hits as f64 / (hits + misses) as f64 * 100.0)
    }
}
