//! Whole-table snapshot cache on top of Moka.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::CacheConfig;
use crate::error::StoreError;

/// An immutable copy of a store table.
pub trait Snapshot: Default + Send + Sync + 'static {
    /// Number of rows captured.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of the most recent reload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The store answered; `entries` rows were loaded (possibly zero).
    Loaded { entries: usize },
    /// The store could not be read; readers were served an empty snapshot.
    Failed { reason: String },
}

/// Holds at most one live snapshot and reloads it wholesale once it expires.
///
/// Snapshots are keyed by an invalidation generation. Invalidating bumps
/// the generation, so a load that started before a write is never served
/// after it. Concurrent misses on the same generation share one load.
pub struct SnapshotCache<T: Snapshot> {
    inner: Cache<u64, Arc<T>>,
    generation: Arc<AtomicU64>,
    last_refresh: Arc<Mutex<Option<RefreshOutcome>>>,
    name: Arc<str>,
    ttl: Duration,
}

// Manual Clone implementation that doesn't require T: Clone
impl<T: Snapshot> Clone for SnapshotCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            generation: Arc::clone(&self.generation),
            last_refresh: Arc::clone(&self.last_refresh),
            name: Arc::clone(&self.name),
            ttl: self.ttl,
        }
    }
}

impl<T: Snapshot> SnapshotCache<T> {
    /// Create a new snapshot cache with the given name and config.
    pub fn new(name: impl Into<Arc<str>>, config: CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            inner,
            generation: Arc::new(AtomicU64::new(0)),
            last_refresh: Arc::new(Mutex::new(None)),
            name: name.into(),
            ttl: config.ttl,
        }
    }

    /// Serve the current snapshot, loading it with `load` if it is absent
    /// or expired.
    ///
    /// Never fails: a failed load is logged, recorded as
    /// [`RefreshOutcome::Failed`] and answered with an empty snapshot that
    /// is not cached, so the next read tries the store again.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let generation = self.generation.load(Ordering::Acquire);

        let result = self
            .inner
            .try_get_with(generation, async {
                debug!("Cache '{}' miss, reloading snapshot", self.name);
                let snapshot = load().await?;
                self.record(
                    generation,
                    RefreshOutcome::Loaded {
                        entries: snapshot.len(),
                    },
                );
                Ok::<_, StoreError>(Arc::new(snapshot))
            })
            .await;

        match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Cache '{}' reload failed, serving empty snapshot: {}", self.name, e);
                self.record(
                    generation,
                    RefreshOutcome::Failed {
                        reason: e.to_string(),
                    },
                );
                Arc::new(T::default())
            }
        }
    }

    /// Drop the current snapshot; the next read reloads.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.invalidate_all();
        debug!("Invalidated cache '{}'", self.name);
    }

    /// Outcome of the most recent reload attempt, if any.
    pub fn last_refresh(&self) -> Option<RefreshOutcome> {
        self.last_refresh.lock().clone()
    }

    /// Keep `outcome` only if no invalidation happened since its load began.
    fn record(&self, generation: u64, outcome: RefreshOutcome) {
        let mut last = self.last_refresh.lock();
        if self.generation.load(Ordering::Acquire) == generation {
            *last = Some(outcome);
        } else {
            debug!("Cache '{}' dropped outcome of superseded load {}", self.name, generation);
        }
    }
}

impl<T: Snapshot> std::fmt::Debug for SnapshotCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("name", &self.name)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Rows(Vec<u32>);

    impl Snapshot for Rows {
        fn len(&self) -> usize {
            self.0.len()
        }
    }

    async fn load_rows(values: Vec<u32>) -> Result<Rows, StoreError> {
        Ok(Rows(values))
    }

    async fn unavailable() -> Result<Rows, StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    fn cache(ttl: Duration) -> SnapshotCache<Rows> {
        SnapshotCache::new("test", CacheConfig::default().ttl(ttl))
    }

    #[tokio::test]
    async fn test_serves_from_memory_while_fresh() {
        let cache = cache(Duration::from_secs(60));
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let rows = cache
                .get_or_load(|| async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, StoreError>(Rows(vec![1, 2]))
                })
                .await;
            assert_eq!(rows.len(), 2);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.last_refresh(), Some(RefreshOutcome::Loaded { entries: 2 }));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = cache(Duration::from_secs(60));

        cache.get_or_load(|| load_rows(vec![1])).await;
        cache.invalidate();
        let rows = cache.get_or_load(|| load_rows(vec![1, 2, 3])).await;

        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_reloaded() {
        let cache = cache(Duration::from_millis(50));

        cache.get_or_load(|| load_rows(vec![1])).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        let rows = cache.get_or_load(|| load_rows(vec![1, 2])).await;

        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_empty_and_not_cached() {
        let cache = cache(Duration::from_secs(60));

        let rows = cache.get_or_load(unavailable).await;
        assert!(rows.is_empty());
        assert!(matches!(cache.last_refresh(), Some(RefreshOutcome::Failed { .. })));

        let rows = cache.get_or_load(|| load_rows(vec![7])).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(cache.last_refresh(), Some(RefreshOutcome::Loaded { entries: 1 }));
    }

    #[tokio::test]
    async fn test_superseded_load_does_not_mask_newer_failure() {
        let cache = cache(Duration::from_secs(60));

        let slow = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_load(|| async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, StoreError>(Rows(vec![1]))
                    })
                    .await
                    .len()
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        cache.invalidate();
        let rows = cache.get_or_load(unavailable).await;
        assert!(rows.is_empty());

        // The old load still answers its own caller.
        assert_eq!(slow.await.unwrap(), 1);
        assert!(matches!(cache.last_refresh(), Some(RefreshOutcome::Failed { .. })));
    }

    #[tokio::test]
    async fn test_empty_load_is_distinct_from_failure() {
        let cache = cache(Duration::from_secs(60));

        cache.get_or_load(|| load_rows(Vec::new())).await;
        assert_eq!(cache.last_refresh(), Some(RefreshOutcome::Loaded { entries: 0 }));
    }
}
