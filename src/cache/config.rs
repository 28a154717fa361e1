//! Cache configuration.

use std::time::Duration;

/// Snapshot lifetime used by the settings and permission caches.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Configuration for a snapshot cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of snapshots held at once.
    /// Only the current generation is ever read; older ones age out.
    pub max_capacity: u64,

    /// Time-to-live of a loaded snapshot.
    /// After this duration the next read reloads from the store.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 4,
            ttl: SNAPSHOT_TTL,
        }
    }
}

impl CacheConfig {
    /// Set max capacity for cache (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set time-to-live for loaded snapshots.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = duration;
        self
    }
}
