use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache_store::CacheStore;
use super::entity::{AvatarEntity, FetchedAvatar};
use super::gravatar::{AvatarFetcher, GravatarClient};
use super::worker_pool::FetchWorkerPool;
use crate::config::AvatarConfig;
use crate::errors::{AppError, AppResult, FetchError, FetchResult};
use crate::utils::HttpClientFactory;

/// Snapshot of service state for the health endpoint
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AvatarServiceStats {
    pub enabled: bool,
    pub cached_entries: usize,
    pub workers: usize,
    pub queue_capacity: usize,
    pub queued: usize,
}

/// Resolves avatar hashes through the cache and the fetch pool
pub struct AvatarService {
    config: AvatarConfig,
    cache: CacheStore<String, Arc<AvatarEntity>>,
    pool: FetchWorkerPool,
    placeholder: Arc<AvatarEntity>,
    shutdown: CancellationToken,
    janitor: JoinHandle<()>,
}

impl AvatarService {
    /// Build the service against the configured provider
    pub async fn new(config: &AvatarConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::configuration)?;

        let client = HttpClientFactory::new(config.client_timeout).create_avatar_client()?;
        let fetcher = Arc::new(GravatarClient::new(client, config.base_url.clone()));
        let placeholder = load_placeholder(&config.placeholder_path).await;

        info!(
            "Avatar service using {} with {} workers",
            config.base_url, config.workers
        );

        Ok(Self::with_fetcher(config, fetcher, placeholder))
    }

    /// Build the service around any fetcher and preloaded placeholder bytes
    pub fn with_fetcher(
        config: &AvatarConfig,
        fetcher: Arc<dyn AvatarFetcher>,
        placeholder: Bytes,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let cache = CacheStore::new(config.cache_ttl);
        let janitor = cache.spawn_janitor(config.cache_sweep_interval, shutdown.clone());
        let pool = FetchWorkerPool::new(fetcher, config.workers, shutdown.clone());

        Self {
            config: config.clone(),
            cache,
            pool,
            placeholder: Arc::new(AvatarEntity::placeholder(placeholder)),
            shutdown,
            janitor,
        }
    }

    /// Resolve `hash` to an avatar, never failing
    ///
    /// Fresh cache hits return immediately. Misses and stale entries wait up
    /// to `wait_timeout` for a fetch; any failure returns the shared
    /// placeholder and leaves the cache as it was.
    pub async fn resolve(&self, hash: &str) -> Arc<AvatarEntity> {
        if !self.config.enabled {
            return self.placeholder.clone();
        }

        let key = hash.to_string();
        let started = Utc::now();
        let cached = self.cache.get(&key).await;

        if let Some(entity) = &cached {
            if !entity.is_stale(started, self.config.refresh_interval) {
                return entity.clone();
            }
        }

        let fetched = match self.fetch(hash).await {
            Ok(fetched) => fetched,
            Err(e) => {
                debug!("Serving placeholder for {} ({}): {}", hash, e.kind(), e);
                return self.placeholder.clone();
            }
        };

        match cached {
            Some(entity) => {
                let updated = Arc::new(entity.refreshed(fetched, started));
                if !self.cache.replace(&key, updated.clone()).await {
                    // evicted while the fetch was running
                    self.insert(key, updated.clone()).await;
                }
                updated
            }
            None => {
                let created = Arc::new(AvatarEntity::new(hash).refreshed(fetched, started));
                self.insert(key, created.clone()).await;
                created
            }
        }
    }

    async fn insert(&self, key: String, entity: Arc<AvatarEntity>) {
        if let Err(e) = self.cache.insert_if_absent(key, entity).await {
            debug!("Keeping concurrently cached avatar: {}", e);
        }
    }

    async fn fetch(&self, hash: &str) -> FetchResult<FetchedAvatar> {
        let deadline = Instant::now() + self.config.wait_timeout;
        let completion = self.pool.submit(hash).await?;

        match timeout_at(deadline, completion).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(FetchError::WorkerUnavailable {
                hash: hash.to_string(),
            }),
            Err(_) => Err(FetchError::timeout(hash, self.config.wait_timeout)),
        }
    }

    /// The shared not-found entity
    pub fn placeholder(&self) -> &Arc<AvatarEntity> {
        &self.placeholder
    }

    pub fn cache(&self) -> &CacheStore<String, Arc<AvatarEntity>> {
        &self.cache
    }

    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    pub async fn stats(&self) -> AvatarServiceStats {
        let pool = self.pool.stats();
        AvatarServiceStats {
            enabled: self.config.enabled,
            cached_entries: self.cache.len().await,
            workers: pool.workers,
            queue_capacity: pool.queue_capacity,
            queued: pool.queued,
        }
    }

    /// Stop the cache janitor and the fetch workers
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutting down avatar service");
            self.shutdown.cancel();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.janitor.is_finished() && self.pool.is_finished()
    }
}

impl Drop for AvatarService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn load_placeholder(path: &Path) -> Bytes {
    match tokio::fs::read(path).await {
        Ok(data) => {
            debug!(
                "Loaded placeholder avatar from {} ({} bytes)",
                path.display(),
                data.len()
            );
            Bytes::from(data)
        }
        Err(e) => {
            warn!(
                "Failed to read placeholder avatar {}: {}, serving an empty image",
                path.display(),
                e
            );
            Bytes::new()
        }
    }
}

/// Lazily constructed [`AvatarService`] shared by request handlers
///
/// Concurrent first calls to [`SharedAvatarService::get`] construct the
/// service exactly once.
pub struct SharedAvatarService {
    config: AvatarConfig,
    cell: OnceCell<Arc<AvatarService>>,
}

impl SharedAvatarService {
    pub fn new(config: AvatarConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already constructed service
    pub fn from_service(service: AvatarService) -> Self {
        Self {
            config: service.config.clone(),
            cell: OnceCell::new_with(Some(Arc::new(service))),
        }
    }

    pub async fn get(&self) -> AppResult<&Arc<AvatarService>> {
        self.cell
            .get_or_try_init(|| async { AvatarService::new(&self.config).await.map(Arc::new) })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
