//! System settings with typed reads and a five-minute snapshot cache.
//!
//! ## Usage
//!
//! ```ignore
//! let settings = SettingsCache::new(store, CacheConfig::default());
//!
//! let per_page = settings.get_int("ItemsPerPage", 10).await;
//! settings.set_int("ItemsPerPage", 25, "admin").await?;
//! ```

mod cache;
pub mod defaults;
mod value;

pub use cache::{SettingsCache, SettingsSnapshot};
pub use defaults::{DEFAULT_SETTINGS, DefaultSetting};
pub use value::SettingValue;
