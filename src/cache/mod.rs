//! Cache module - TTL snapshot caching using Moka.
//!
//! The settings and permission caches share one design: the whole
//! store table is loaded into an immutable snapshot, served from memory
//! until it expires, and then reloaded in one piece.
//!
//! ## Architecture
//!
//! - `CacheConfig` - capacity and TTL (5 minutes unless overridden)
//! - `SnapshotCache` - generic holder of the current snapshot
//! - `Snapshot` - implemented by each cache's table type
//!
//! ## Usage
//!
//! ```ignore
//! let cache: SnapshotCache<SettingsSnapshot> =
//!     SnapshotCache::new("system_settings", CacheConfig::default());
//!
//! let snapshot = cache.get_or_load(|| load_settings(&store)).await;
//! ```

mod config;
mod snapshot;

pub use config::{CacheConfig, SNAPSHOT_TTL};
pub use snapshot::{RefreshOutcome, Snapshot, SnapshotCache};
