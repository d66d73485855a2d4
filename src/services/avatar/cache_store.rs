//! Typed in-memory store with time-based expiry

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{CacheError, CacheResult};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Concurrent keyed store where every entry expires `ttl` after insertion
///
/// Expired entries are invisible to readers immediately and are physically
/// removed by [`CacheStore::sweep`], either on demand or from the janitor task.
/// Replacing a value does not extend its expiry.
pub struct CacheStore<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<K, V> Clone for CacheStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
        }
    }
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Look up a live entry
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    /// Insert `value` unless a live entry already exists under `key`
    pub async fn insert_if_absent(&self, key: K, value: V) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        if let Some(existing) = entries.get(&key) {
            if !existing.is_expired(now) {
                return Err(CacheError::AlreadyExists {
                    key: key.to_string(),
                });
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    /// Swap the value of a live entry, keeping its original expiry
    ///
    /// Returns false when there is no live entry to replace.
    pub async fn replace(&self, key: &K, value: V) -> bool {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.value = value;
                true
            }
            _ => false,
        }
    }

    /// Number of stored entries, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove every expired entry, returning how many were dropped
    pub async fn sweep(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Run [`CacheStore::sweep`] every `period` until `shutdown` is cancelled
    pub fn spawn_janitor(&self, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.sweep().await;
                        if removed > 0 {
                            debug!("Cache sweep removed {} expired entries", removed);
                        }
                    }
                    _ = shutdown.cancelled() => {
                        debug!("Cache janitor stopped");
                        break;
                    }
                }
            }
        })
    }
}
