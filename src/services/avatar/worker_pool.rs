//! Fixed-size pool of avatar fetch workers
//!
//! Tasks travel through a bounded queue whose capacity equals the worker
//! count. Submitting to a full queue waits for space; nothing is dropped.
//! Workers never retry and are never cancelled by the submitter: a caller
//! that stops waiting simply drops its completion receiver while the worker
//! finishes the upstream calls and discards the result.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::entity::FetchedAvatar;
use super::gravatar::AvatarFetcher;
use crate::errors::{FetchError, FetchResult};

/// Completion signal for one submitted task
pub type FetchCompletion = oneshot::Receiver<FetchResult<FetchedAvatar>>;

struct FetchTask {
    hash: String,
    reply: oneshot::Sender<FetchResult<FetchedAvatar>>,
}

/// Point-in-time view of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub queue_capacity: usize,
    pub queued: usize,
}

pub struct FetchWorkerPool {
    sender: mpsc::Sender<FetchTask>,
    workers: usize,
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl FetchWorkerPool {
    /// Spawn `workers` workers on the current runtime
    ///
    /// `workers` must be non-zero; configuration validation guarantees it.
    pub fn new(fetcher: Arc<dyn AvatarFetcher>, workers: usize, shutdown: CancellationToken) -> Self {
        let workers = workers.max(1);
        let (sender, receiver) = mpsc::channel(workers);
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..workers)
            .map(|id| {
                tokio::spawn(Self::run_worker(
                    id,
                    receiver.clone(),
                    fetcher.clone(),
                    shutdown.clone(),
                ))
            })
            .collect();

        info!("Started avatar fetch pool with {} workers", workers);

        Self {
            sender,
            workers,
            shutdown,
            handles,
        }
    }

    async fn run_worker(
        id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<FetchTask>>>,
        fetcher: Arc<dyn AvatarFetcher>,
        shutdown: CancellationToken,
    ) {
        loop {
            let task = {
                let mut receiver = receiver.lock().await;
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => None,
                    task = receiver.recv() => task,
                }
            };

            let Some(task) = task else {
                break;
            };

            let result = fetcher.fetch(&task.hash).await;
            if task.reply.send(result).is_err() {
                debug!(
                    "Worker {} finished {} after its caller stopped waiting",
                    id, task.hash
                );
            }
        }

        debug!("Avatar fetch worker {} stopped", id);
    }

    /// Queue a fetch for `hash`, waiting for queue space if necessary
    pub async fn submit<H: Into<String>>(&self, hash: H) -> FetchResult<FetchCompletion> {
        let hash = hash.into();
        let (reply, completion) = oneshot::channel();

        self.sender
            .send(FetchTask {
                hash: hash.clone(),
                reply,
            })
            .await
            .map_err(|_| FetchError::WorkerUnavailable { hash })?;

        Ok(completion)
    }

    pub fn stats(&self) -> PoolStats {
        let queue_capacity = self.sender.max_capacity();
        PoolStats {
            workers: self.workers,
            queue_capacity,
            queued: queue_capacity - self.sender.capacity(),
        }
    }

    /// Stop workers once their current task completes
    ///
    /// Tasks still queued are dropped without being fetched; their
    /// completions resolve to a receive error.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Fetcher that blocks each call until a permit is released
    struct GatedFetcher {
        gate: Semaphore,
        started: mpsc::UnboundedSender<String>,
        calls: AtomicUsize,
    }

    impl GatedFetcher {
        fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
            let (started, started_rx) = mpsc::unbounded_channel();
            let fetcher = Arc::new(Self {
                gate: Semaphore::new(0),
                started,
                calls: AtomicUsize::new(0),
            });
            (fetcher, started_rx)
        }
    }

    #[async_trait]
    impl AvatarFetcher for GatedFetcher {
        async fn fetch(&self, hash: &str) -> FetchResult<FetchedAvatar> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.started.send(hash.to_string());
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
            if hash == "fail" {
                return Err(FetchError::UpstreamStatus {
                    hash: hash.to_string(),
                    status: 500,
                });
            }
            Ok(FetchedAvatar {
                data: Bytes::from(hash.to_string()),
                is_custom: Some(false),
            })
        }
    }

    #[tokio::test]
    async fn test_completion_carries_fetch_result() {
        let (fetcher, _started) = GatedFetcher::new();
        fetcher.gate.add_permits(2);
        let pool = FetchWorkerPool::new(fetcher.clone(), 2, CancellationToken::new());

        let ok = pool.submit("abc").await.unwrap().await.unwrap().unwrap();
        assert_eq!(ok.data.as_ref(), b"abc");

        let failed = pool.submit("fail").await.unwrap().await.unwrap();
        assert!(matches!(failed, Err(FetchError::UpstreamStatus { status: 500, .. })));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_queue_blocks_submitter() {
        let (fetcher, mut started) = GatedFetcher::new();
        let pool = FetchWorkerPool::new(fetcher.clone(), 1, CancellationToken::new());

        // occupies the only worker
        let first = pool.submit("one").await.unwrap();
        assert_eq!(started.recv().await.as_deref(), Some("one"));

        // fills the queue
        let second = pool.submit("two").await.unwrap();
        assert_eq!(pool.stats().queued, 1);

        // no space left: submission waits
        let blocked = tokio::time::timeout(Duration::from_millis(50), pool.submit("three")).await;
        assert!(blocked.is_err());

        fetcher.gate.add_permits(3);
        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());
        let third = pool.submit("three").await.unwrap();
        assert!(third.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_worker_keeps_running_after_caller_gives_up() {
        let (fetcher, mut started) = GatedFetcher::new();
        let pool = FetchWorkerPool::new(fetcher.clone(), 1, CancellationToken::new());

        let abandoned = pool.submit("slow").await.unwrap();
        assert_eq!(started.recv().await.as_deref(), Some("slow"));
        drop(abandoned);

        fetcher.gate.add_permits(2);
        // the same worker picks up the next task once the abandoned one ends
        let next = pool.submit("next").await.unwrap().await.unwrap().unwrap();
        assert_eq!(next.data.as_ref(), b"next");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_drops_queued_tasks() {
        let (fetcher, mut started) = GatedFetcher::new();
        let pool = FetchWorkerPool::new(fetcher.clone(), 1, CancellationToken::new());

        let in_flight = pool.submit("a").await.unwrap();
        assert_eq!(started.recv().await.as_deref(), Some("a"));
        let queued = pool.submit("b").await.unwrap();

        pool.shutdown();
        fetcher.gate.add_permits(2);

        // the running fetch completes, the queued one never starts
        assert!(in_flight.await.unwrap().is_ok());
        assert!(queued.await.is_err());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_workers_and_rejects_work() {
        let (fetcher, _started) = GatedFetcher::new();
        let pool = FetchWorkerPool::new(fetcher, 3, CancellationToken::new());
        assert_eq!(pool.stats().workers, 3);
        assert_eq!(pool.stats().queue_capacity, 3);

        pool.shutdown();
        for _ in 0..100 {
            if pool.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(pool.is_finished());

        let result = pool.submit("late").await;
        assert!(matches!(result, Err(FetchError::WorkerUnavailable { .. })));
    }
}
