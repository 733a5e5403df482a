//! Cascading invalidation across the cache layers.
//!
//! One mutation event fans out over three independently-owned layers: the
//! key-value store entries, the server-rendered page, and the edge/CDN cache.
//! Each invalidation call is a linear saga with no persisted state; the four
//! steps run strictly sequentially, each one is independently absorbed on
//! failure, and the call never returns an error. A stale edge entry for a few
//! extra minutes beats failing the write path that triggered invalidation.

use crate::api_response::ApiResponseCache;
use crate::backend::CacheBackend;
use crate::edge::EdgePurger;
use crate::profile::{ProfileCache, ProfileRecord};
use crate::revalidate::PageRevalidator;
use crate::social_links::SocialLinksCache;

/// What each step of one invalidation call actually did.
///
/// Failures are logged where they happen; this summary exists so callers and
/// tests can observe the saga without parsing logs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvalidationOutcome {
    /// A profile-cache delete was issued.
    pub profile_deleted: bool,
    /// The dependent social-links entry was deleted.
    pub social_links_deleted: bool,
    /// The page revalidation call succeeded.
    pub revalidated: bool,
    /// The edge purge call succeeded.
    pub purged: bool,
}

/// Orchestrates invalidation for profile mutations.
///
/// `L` is the social-links value type of the application's cache; only key
/// derivation is used here, never the value itself.
pub struct InvalidationPipeline<B, P, L, R, E> {
    profiles: ProfileCache<B, P>,
    social_links: SocialLinksCache<B, L>,
    api_responses: ApiResponseCache<B>,
    revalidator: R,
    purger: E,
}

impl<B, P, L, R, E> InvalidationPipeline<B, P, L, R, E>
where
    B: CacheBackend,
    P: ProfileRecord,
    R: PageRevalidator,
    E: EdgePurger,
{
    pub fn new(
        profiles: ProfileCache<B, P>,
        social_links: SocialLinksCache<B, L>,
        api_responses: ApiResponseCache<B>,
        revalidator: R,
        purger: E,
    ) -> Self {
        InvalidationPipeline {
            profiles,
            social_links,
            api_responses,
            revalidator,
            purger,
        }
    }

    /// Invalidate everything derived from one profile.
    ///
    /// Steps, strictly in order: read the cached profile (to learn its id),
    /// delete the profile entry regardless, delete the dependent social-links
    /// entry when an id was found, revalidate the public page, purge the edge
    /// cache for the same path.
    pub async fn invalidate_profile(&self, username: &str) -> InvalidationOutcome {
        let mut outcome = InvalidationOutcome::default();

        // The cached copy is the only place to learn the profile id without
        // touching the system of record; read it before deleting.
        let cached: Option<P> = self.profiles.get(username).await;
        self.profiles.delete(username).await;
        outcome.profile_deleted = true;

        match &cached {
            Some(profile) => {
                self.social_links.delete(profile.profile_id()).await;
                outcome.social_links_deleted = true;
            }
            None => {
                debug!(
                    "No cached profile for {}, skipping social-links delete",
                    username
                );
            }
        }

        let page_path = page_path_for(username);
        self.revalidate_and_purge(&page_path, &mut outcome).await;

        info!("✓ Invalidation for {} finished: {:?}", username, outcome);
        outcome
    }

    /// Invalidate after a social-links mutation, keyed by profile id.
    ///
    /// The owning username comes from the `profile_id -> username` secondary
    /// index the profile cache maintains. When the index has no entry the
    /// social-links delete still happens, but the page steps are skipped: the
    /// page path cannot be derived without a username.
    pub async fn invalidate_social_links(&self, profile_id: &str) -> InvalidationOutcome {
        let mut outcome = InvalidationOutcome::default();

        let username = self.profiles.resolve_username(profile_id).await;

        self.social_links.delete(profile_id).await;
        outcome.social_links_deleted = true;

        match username {
            Some(username) => {
                let page_path = page_path_for(&username);
                self.revalidate_and_purge(&page_path, &mut outcome).await;
            }
            None => {
                warn!(
                    "No username indexed for profile {}, skipping page revalidation and purge",
                    profile_id
                );
            }
        }

        outcome
    }

    /// Drop every cached API response for a path.
    pub async fn invalidate_api_cache(&self, path: &str) {
        self.api_responses.delete_by_path(path).await;
    }

    async fn revalidate_and_purge(&self, page_path: &str, outcome: &mut InvalidationOutcome) {
        match self.revalidator.revalidate(page_path).await {
            Ok(()) => outcome.revalidated = true,
            Err(e) => warn!("✗ Page revalidation failed for {}: {}", page_path, e),
        }

        if self.purger.is_configured() {
            match self.purger.purge(page_path).await {
                Ok(()) => outcome.purged = true,
                Err(e) => warn!("✗ Edge purge failed for {}: {}", page_path, e),
            }
        } else {
            debug!("Edge purge not configured, skipping {}", page_path);
        }
    }
}

fn page_path_for(username: &str) -> String {
    format!("/{}", username.to_lowercase())
}
