//! Popular-profiles cache: a single key holding an ordered username list.

use crate::backend::CacheBackend;
use crate::client::CacheClient;
use crate::keys::POPULAR_PROFILES_KEY;
use std::time::Duration;

/// Cache for the ordered list of popular usernames.
///
/// Invalidation is a real `delete`, never a write of an empty list with a
/// zero TTL: stores that treat zero as "no expiry" would keep that entry
/// around forever.
#[derive(Clone)]
pub struct PopularProfilesCache<B> {
    client: CacheClient<B>,
    ttl: Duration,
}

impl<B: CacheBackend> PopularProfilesCache<B> {
    pub fn new(client: CacheClient<B>, ttl: Duration) -> Self {
        PopularProfilesCache { client, ttl }
    }

    /// The cached list, in ranking order. `None` on miss.
    pub async fn get(&self) -> Option<Vec<String>> {
        self.client.get(POPULAR_PROFILES_KEY).await
    }

    pub async fn set(&self, usernames: &[String]) {
        self.client
            .set(POPULAR_PROFILES_KEY, &usernames, Some(self.ttl))
            .await;
    }

    pub async fn delete(&self) {
        self.client.del(POPULAR_PROFILES_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn cache() -> PopularProfilesCache<InMemoryBackend> {
        PopularProfilesCache::new(
            CacheClient::new(InMemoryBackend::new()),
            Duration::from_secs(86400),
        )
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order() {
        let cache = cache();
        let usernames = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];

        cache.set(&usernames).await;
        assert_eq!(cache.get().await, Some(usernames));
    }

    #[tokio::test]
    async fn test_delete_is_a_real_delete() {
        let cache = cache();
        cache.set(&["alice".to_string()]).await;

        cache.delete().await;
        assert_eq!(cache.get().await, None);
    }
}
