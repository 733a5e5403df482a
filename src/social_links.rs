//! Social-links cache namespace, keyed by profile id (not username).

use crate::backend::CacheBackend;
use crate::client::CacheClient;
use crate::keys;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;

/// Typed cache for a profile's social-link list.
///
/// `L` is whatever the application stores for one profile's links, typically a
/// `Vec` of link records. `delete` does not touch the value type, so the
/// invalidation pipeline can drop entries without knowing `L`'s shape.
pub struct SocialLinksCache<B, L> {
    client: CacheClient<B>,
    ttl: Duration,
    _marker: PhantomData<fn() -> L>,
}

impl<B: Clone, L> Clone for SocialLinksCache<B, L> {
    fn clone(&self) -> Self {
        SocialLinksCache {
            client: self.client.clone(),
            ttl: self.ttl,
            _marker: PhantomData,
        }
    }
}

impl<B: CacheBackend, L> SocialLinksCache<B, L> {
    pub fn new(client: CacheClient<B>, ttl: Duration) -> Self {
        SocialLinksCache {
            client,
            ttl,
            _marker: PhantomData,
        }
    }

    pub async fn delete(&self, profile_id: &str) {
        self.client.del(&keys::social_links_key(profile_id)).await;
    }
}

impl<B, L> SocialLinksCache<B, L>
where
    B: CacheBackend,
    L: Serialize + DeserializeOwned + Send + Sync,
{
    pub async fn get(&self, profile_id: &str) -> Option<L> {
        self.client.get(&keys::social_links_key(profile_id)).await
    }

    pub async fn set(&self, profile_id: &str, links: &L) {
        self.client
            .set(&keys::social_links_key(profile_id), links, Some(self.ttl))
            .await;
    }
}
