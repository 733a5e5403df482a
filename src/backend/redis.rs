//! Redis cache backend implementation.

use super::CacheBackend;
use crate::client::CacheClient;
use crate::error::{Error, Result};
use deadpool_redis::{Config as DeadpoolConfig, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use std::time::Duration;

/// Default Redis connection pool size.
/// Formula: (CPU cores × 2) + 1
/// For 8-core systems: 16 connections is optimal
/// Override with REDIS_POOL_SIZE environment variable
const DEFAULT_POOL_SIZE: u32 = 16;

/// Configuration for the Redis backend.
///
/// Credentials travel in the URL (`redis://:password@host:port`), so a store
/// token from the environment should be folded into the URL at the
/// composition root.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub url: String, // e.g. "redis://localhost:6379"
    pub connection_timeout: Duration,
    pub pool_size: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            url: "redis://localhost:6379".to_string(),
            connection_timeout: Duration::from_secs(5),
            pool_size: 10,
        }
    }
}

/// Redis backend with connection pooling and async operations.
///
/// # Example
///
/// ```no_run
/// # use biolink_cache::backend::{RedisBackend, RedisConfig, CacheBackend};
/// # use biolink_cache::error::Result;
/// # async fn example() -> Result<()> {
/// let config = RedisConfig {
///     url: "redis://localhost:6379".to_string(),
///     ..Default::default()
/// };
///
/// let backend = RedisBackend::new(config)?;
/// backend.set("key", b"value".to_vec(), None).await?;
/// let value = backend.get("key").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Create a new Redis backend from configuration.
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails
    pub fn new(config: RedisConfig) -> Result<Self> {
        let mut pool_config = DeadpoolConfig::from_url(config.url.clone());
        pool_config.pool = Some(PoolConfig::new(config.pool_size as usize));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::ConfigError(format!("Failed to create connection pool: {}", e)))?;

        info!(
            "✓ Redis backend initialized with server: {} (pool size: {})",
            config.url, config.pool_size
        );

        Ok(RedisBackend { pool })
    }

    /// Create from a store URL directly.
    ///
    /// Pool size is determined by:
    /// 1. `REDIS_POOL_SIZE` environment variable (if set)
    /// 2. `DEFAULT_POOL_SIZE` constant (16)
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails
    pub fn from_url(url: String) -> Result<Self> {
        let pool_size = std::env::var("REDIS_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        let config = RedisConfig {
            url,
            pool_size,
            ..Default::default()
        };
        Self::new(config)
    }

    /// Build a fail-open client from store configuration.
    ///
    /// Missing credentials or a pool that cannot be created yield a disabled
    /// client (a warn line, not a startup error): every operation then
    /// behaves as a permanent miss/no-op. A configured token is folded into
    /// the URL as the password when the URL carries no credentials of its own.
    pub fn client_from_config(config: &crate::config::StoreConfig) -> CacheClient<RedisBackend> {
        let Some(url) = &config.url else {
            info!("Cache store not configured, caching disabled");
            return CacheClient::disabled();
        };

        let url = match &config.token {
            Some(token) if !url.contains('@') => match url.split_once("://") {
                Some((scheme, rest)) => format!("{}://:{}@{}", scheme, token, rest),
                None => url.clone(),
            },
            _ => url.clone(),
        };

        match RedisBackend::from_url(url) {
            Ok(backend) => CacheClient::new(backend).with_op_timeout(config.op_timeout),
            Err(e) => {
                warn!("✗ Cache store unavailable, caching disabled: {}", e);
                CacheClient::disabled()
            }
        }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::BackendError(format!("Failed to get Redis connection: {}", e)))
    }
}

impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;

        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(Some(value)) => {
                debug!("✓ Redis GET {} -> HIT", key);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("✓ Redis GET {} -> MISS", key);
                Ok(None)
            }
            Err(e) => Err(Error::BackendError(format!(
                "Redis GET failed for key {}: {}",
                key, e
            ))),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn().await?;

        match ttl {
            Some(d) => {
                // SETEX rejects a zero expiry; clamp to the 1s minimum.
                let secs = d.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, secs).await.map_err(|e| {
                    Error::BackendError(format!("Redis SETEX failed for key {}: {}", key, e))
                })?;
                debug!("✓ Redis SETEX {} (TTL: {:?})", key, d);
            }
            None => {
                conn.set::<_, _, ()>(key, value).await.map_err(|e| {
                    Error::BackendError(format!("Redis SET failed for key {}: {}", key, e))
                })?;
                debug!("✓ Redis SET {}", key);
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn().await?;

        conn.del::<_, ()>(key).await.map_err(|e| {
            Error::BackendError(format!("Redis DEL failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis DEL {}", key);
        Ok(())
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;

        // Plain MGET keeps input order and yields nil for misses; the raw
        // command avoids the high-level single-key special case.
        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(*key);
        }

        let values: Vec<Option<Vec<u8>>> = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::BackendError(format!("Redis MGET failed: {}", e)))?;

        debug!("✓ Redis MGET {} keys (batch operation)", keys.len());
        Ok(values)
    }

    async fn mset(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn().await?;

        match ttl {
            Some(d) => {
                // MSET has no expiry form; pipeline one SETEX per entry so the
                // batch still costs a single round trip.
                let secs = d.as_secs().max(1);
                let mut pipe = redis::pipe();
                for (key, value) in entries {
                    pipe.cmd("SETEX").arg(key).arg(secs).arg(value.as_slice()).ignore();
                }
                pipe.query_async::<()>(&mut conn)
                    .await
                    .map_err(|e| Error::BackendError(format!("Redis SETEX batch failed: {}", e)))?;
                debug!("✓ Redis SETEX batch {} keys (TTL: {:?})", entries.len(), d);
            }
            None => {
                let mut cmd = redis::cmd("MSET");
                for (key, value) in entries {
                    cmd.arg(key).arg(value.as_slice());
                }
                cmd.query_async::<()>(&mut conn)
                    .await
                    .map_err(|e| Error::BackendError(format!("Redis MSET failed: {}", e)))?;
                debug!("✓ Redis MSET {} keys", entries.len());
            }
        }

        Ok(())
    }

    async fn mdelete(&self, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn().await?;

        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(*key);
        }
        cmd.query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::BackendError(format!("Redis DEL batch failed: {}", e)))?;

        debug!("✓ Redis DEL {} keys", keys.len());
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn().await?;

        let keys: Vec<String> = conn.keys(pattern).await.map_err(|e| {
            Error::BackendError(format!("Redis KEYS failed for pattern {}: {}", pattern, e))
        })?;

        debug!("✓ Redis KEYS {} -> {} matches", pattern, keys.len());
        Ok(keys)
    }

    async fn incr(&self, key: &str, by: i64) -> Result<i64> {
        let mut conn = self.conn().await?;

        let value: i64 = conn.incr(key, by).await.map_err(|e| {
            Error::BackendError(format!("Redis INCRBY failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis INCRBY {} {} -> {}", key, by, value);
        Ok(value)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.pool.get().await {
            Ok(mut conn) => {
                let pong: std::result::Result<String, _> =
                    redis::cmd("PING").query_async(&mut conn).await;
                Ok(pong.is_ok())
            }
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config_default() {
        let config = RedisConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.pool_size, 10);
    }

    #[test]
    fn test_client_from_config_without_url_is_disabled() {
        let client = RedisBackend::client_from_config(&crate::config::StoreConfig::default());
        assert!(!client.is_enabled());
    }

    #[test]
    fn test_client_from_config_with_url_is_enabled() {
        // Pool creation is lazy; no server needs to be listening.
        let config = crate::config::StoreConfig {
            url: Some("redis://localhost:6379".to_string()),
            token: Some("secret".to_string()),
            ..Default::default()
        };
        let client = RedisBackend::client_from_config(&config);
        assert!(client.is_enabled());
    }

    #[test]
    fn test_redis_config_custom() {
        let config = RedisConfig {
            url: "redis://cache1:6379".to_string(),
            connection_timeout: Duration::from_secs(5),
            pool_size: 20,
        };

        assert_eq!(config.url, "redis://cache1:6379");
        assert_eq!(config.pool_size, 20);
    }
}
