//! Profile cache namespace, keyed by lower-cased username.
//!
//! Alongside each profile entry this cache maintains a secondary index
//! `profile_id:<id> -> username` with the same TTL, so that invalidation by
//! profile id can recover the page path without scanning the whole namespace.

use crate::backend::CacheBackend;
use crate::client::CacheClient;
use crate::keys;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;

/// Seam between the cache layer and whatever profile type the application
/// stores. The invalidation pipeline only needs these two accessors.
pub trait ProfileRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Stable profile id, the key of the social-links namespace.
    fn profile_id(&self) -> &str;

    /// Public username, the page path component.
    fn username(&self) -> &str;
}

/// Typed cache for profiles, keyed by username.
pub struct ProfileCache<B, P> {
    client: CacheClient<B>,
    ttl: Duration,
    _marker: PhantomData<fn() -> P>,
}

impl<B: Clone, P> Clone for ProfileCache<B, P> {
    fn clone(&self) -> Self {
        ProfileCache {
            client: self.client.clone(),
            ttl: self.ttl,
            _marker: PhantomData,
        }
    }
}

impl<B: CacheBackend, P: ProfileRecord> ProfileCache<B, P> {
    pub fn new(client: CacheClient<B>, ttl: Duration) -> Self {
        ProfileCache {
            client,
            ttl,
            _marker: PhantomData,
        }
    }

    pub async fn get(&self, username: &str) -> Option<P> {
        self.client.get(&keys::profile_key(username)).await
    }

    /// Store a profile and refresh its id→username index entry.
    pub async fn set(&self, username: &str, profile: &P) {
        let key = keys::profile_key(username);
        self.client.set(&key, profile, Some(self.ttl)).await;

        let index_key = keys::profile_index_key(profile.profile_id());
        self.client
            .set(&index_key, &username.to_lowercase(), Some(self.ttl))
            .await;
    }

    pub async fn delete(&self, username: &str) {
        self.client.del(&keys::profile_key(username)).await;
    }

    /// Batch fetch. Returns a `lowercased-username -> Option<profile>` map,
    /// rebuilt by stripping the namespace prefix back off each store key.
    pub async fn get_many(&self, usernames: &[&str]) -> HashMap<String, Option<P>> {
        let cache_keys: Vec<String> = usernames.iter().map(|u| keys::profile_key(u)).collect();
        let refs: Vec<&str> = cache_keys.iter().map(String::as_str).collect();

        self.client
            .mget::<P>(&refs)
            .await
            .into_iter()
            .filter_map(|(key, value)| {
                keys::username_from_profile_key(&key).map(|username| (username.to_string(), value))
            })
            .collect()
    }

    /// Batch store; one expiring batch write for the profiles, one for their
    /// index entries.
    pub async fn set_many(&self, entries: &[(String, P)]) {
        let profiles: Vec<(String, &P, Option<Duration>)> = entries
            .iter()
            .map(|(username, profile)| (keys::profile_key(username), profile, Some(self.ttl)))
            .collect();
        self.client.mset(&profiles).await;

        let index: Vec<(String, String, Option<Duration>)> = entries
            .iter()
            .map(|(username, profile)| {
                (
                    keys::profile_index_key(profile.profile_id()),
                    username.to_lowercase(),
                    Some(self.ttl),
                )
            })
            .collect();
        self.client.mset(&index).await;
    }

    /// Look up the owning username for a profile id through the secondary
    /// index. `None` when the index entry expired or was never written.
    pub async fn resolve_username(&self, profile_id: &str) -> Option<String> {
        self.client.get(&keys::profile_index_key(profile_id)).await
    }
}
