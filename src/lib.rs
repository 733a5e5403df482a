//! # biolink-cache
//!
//! Multi-layer cache and cascading invalidation for public profile pages.
//!
//! A read-through cache sits in front of the profile/social-link data store;
//! when underlying data changes, an invalidation pipeline keeps three
//! independently-owned layers consistent: the key-value store entries, the
//! server-rendered page cache, and the edge/CDN cache.
//!
//! ## Design rules
//!
//! - **Fail-open everywhere.** Caching is a pure optimization, never a
//!   correctness dependency. Store errors are caught and logged, reads degrade
//!   to misses, writes to no-ops. A cache outage must not become an
//!   application outage.
//! - **No hidden singletons.** The [`CacheClient`] is built once at the
//!   composition root and handed to each typed namespace.
//! - **Best-effort sagas.** Invalidation runs its steps strictly in order,
//!   absorbs each failure independently, and never returns an error.
//!
//! ## Quick Start
//!
//! ```
//! use biolink_cache::{
//!     backend::InMemoryBackend, config::TtlConfig, CacheClient, ProfileCache, ProfileRecord,
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Profile {
//!     id: String,
//!     username: String,
//! }
//!
//! impl ProfileRecord for Profile {
//!     fn profile_id(&self) -> &str {
//!         &self.id
//!     }
//!     fn username(&self) -> &str {
//!         &self.username
//!     }
//! }
//!
//! # async fn example() {
//! let ttl = TtlConfig::default();
//! let client = CacheClient::new(InMemoryBackend::new());
//! let profiles: ProfileCache<_, Profile> = ProfileCache::new(client.clone(), ttl.profile);
//!
//! let bob = Profile { id: "p1".into(), username: "bob".into() };
//! profiles.set("bob", &bob).await;
//! let cached = profiles.get("BOB").await; // usernames are case-normalized
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod api_response;
pub mod backend;
pub mod client;
pub mod config;
pub mod edge;
pub mod error;
pub mod invalidation;
pub mod keys;
pub mod monitor;
pub mod popular;
pub mod profile;
pub mod revalidate;
pub mod social_links;

// Re-exports for convenience
pub use api_response::ApiResponseCache;
pub use backend::CacheBackend;
pub use client::CacheClient;
pub use config::{EdgeConfig, RevalidateConfig, StoreConfig, TtlConfig};
pub use edge::{DisabledEdgePurger, EdgePurger, HttpEdgePurger};
pub use error::{Error, Result};
pub use invalidation::{InvalidationOutcome, InvalidationPipeline};
pub use keys::CacheLayer;
pub use monitor::CacheMonitor;
pub use popular::PopularProfilesCache;
pub use profile::{ProfileCache, ProfileRecord};
pub use revalidate::{HttpPageRevalidator, NoopPageRevalidator, PageRevalidator};
pub use social_links::SocialLinksCache;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
