//! Avatar resolution
//!
//! Turns a 32-character hex hash into an image. Lookups go through a TTL
//! [`CacheStore`]; misses and entries older than the refresh window are
//! fetched by a bounded [`FetchWorkerPool`] that speaks the provider's
//! two-request protocol. Any failure, including the caller's wait budget
//! running out, yields one shared placeholder entity and leaves the cache
//! as it was.
//!
//! ```no_run
//! use avatar_proxy::config::AvatarConfig;
//! use avatar_proxy::services::avatar::AvatarService;
//!
//! # async fn run() -> avatar_proxy::errors::AppResult<()> {
//! let service = AvatarService::new(&AvatarConfig::default()).await?;
//! let avatar = service.resolve("9e107d9d372bb6826bd81d3542a419d6").await;
//! println!("{} bytes, custom: {}", avatar.data().len(), avatar.is_custom());
//! # Ok(())
//! # }
//! ```

pub mod cache_store;
pub mod entity;
pub mod gravatar;
pub mod service;
pub mod worker_pool;

pub use cache_store::CacheStore;
pub use entity::{AvatarEntity, AvatarState, FetchedAvatar};
pub use gravatar::{AvatarFetcher, GravatarClient};
pub use service::{AvatarService, AvatarServiceStats, SharedAvatarService};
pub use worker_pool::{FetchCompletion, FetchWorkerPool, PoolStats};
