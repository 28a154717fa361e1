//! System settings cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::defaults;
use super::value::SettingValue;
use crate::cache::{CacheConfig, RefreshOutcome, Snapshot, SnapshotCache};
use crate::database::{DEFAULT_CATEGORY, SettingEntry, SettingValueType, SettingsStore, UpsertOutcome};
use crate::error::StoreError;

/// Every stored setting keyed by its exact key.
#[derive(Debug, Default)]
pub struct SettingsSnapshot {
    entries: HashMap<String, SettingEntry>,
}

impl SettingsSnapshot {
    pub fn get(&self, key: &str) -> Option<&SettingEntry> {
        self.entries.get(key)
    }
}

impl Snapshot for SettingsSnapshot {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<SettingEntry> for SettingsSnapshot {
    fn from_iter<I: IntoIterator<Item = SettingEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|e| (e.key.clone(), e)).collect(),
        }
    }
}

/// Typed access to system settings with bounded staleness.
///
/// Reads are served from a snapshot that is reloaded every five minutes.
/// Writes go straight to the store and drop the snapshot, so the writing
/// process sees its own change on the next read. Other processes may keep
/// serving the old value until their snapshot expires.
pub struct SettingsCache<S: SettingsStore> {
    store: S,
    cache: SnapshotCache<SettingsSnapshot>,
}

impl<S: SettingsStore> SettingsCache<S> {
    pub fn new(store: S, config: CacheConfig) -> Self {
        Self {
            store,
            cache: SnapshotCache::new("system_settings", config),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn snapshot(&self) -> Arc<SettingsSnapshot> {
        self.cache
            .get_or_load(|| async {
                let entries = self.store.load_all_settings().await?;
                Ok::<_, StoreError>(entries.into_iter().collect::<SettingsSnapshot>())
            })
            .await
    }

    /// Read a setting as `T`, or `default` if it is missing or malformed.
    pub async fn get<T: SettingValue>(&self, key: &str, default: T) -> T {
        let snapshot = self.snapshot().await;
        let Some(entry) = snapshot.get(key) else {
            return default;
        };

        match T::parse_setting(&entry.value) {
            Some(value) => value,
            None => {
                debug!(
                    "Setting {} has malformed {} value {:?}, using default",
                    key,
                    T::VALUE_TYPE.as_str(),
                    entry.value
                );
                default
            }
        }
    }

    pub async fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key, default.to_string()).await
    }

    pub async fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key, default).await
    }

    pub async fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key, default).await
    }

    pub async fn get_datetime(&self, key: &str, default: DateTime<Utc>) -> DateTime<Utc> {
        self.get(key, default).await
    }

    /// Write a setting and invalidate the cache.
    ///
    /// The write is durable when this returns `Ok`. `Unchanged` means the
    /// stored value already matched.
    pub async fn set<T: SettingValue>(
        &self,
        key: &str,
        value: T,
        modified_by: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        let entry = Self::entry_for(key, value.to_setting(), modified_by);
        let outcome = self.store.upsert_setting(entry).await?;
        self.cache.invalidate();

        info!("Setting {} written by {}: {:?}", key, modified_by, outcome);
        Ok(outcome)
    }

    pub async fn set_string(&self, key: &str, value: &str, modified_by: &str) -> Result<UpsertOutcome, StoreError> {
        self.set(key, value.to_string(), modified_by).await
    }

    pub async fn set_int(&self, key: &str, value: i64, modified_by: &str) -> Result<UpsertOutcome, StoreError> {
        self.set(key, value, modified_by).await
    }

    pub async fn set_bool(&self, key: &str, value: bool, modified_by: &str) -> Result<UpsertOutcome, StoreError> {
        self.set(key, value, modified_by).await
    }

    pub async fn set_datetime(
        &self,
        key: &str,
        value: DateTime<Utc>,
        modified_by: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        self.set(key, value, modified_by).await
    }

    /// Write several raw values in one store transaction, then invalidate once.
    pub async fn set_multiple<I, K, V>(&self, values: I, modified_by: &str) -> Result<Vec<UpsertOutcome>, StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: Vec<SettingEntry> = values
            .into_iter()
            .map(|(k, v)| {
                let key: String = k.into();
                Self::entry_for(&key, v.into(), modified_by)
            })
            .collect();

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let count = entries.len();
        let outcomes = self.store.upsert_settings(entries).await?;
        self.cache.invalidate();

        info!("{} settings written by {}", count, modified_by);
        Ok(outcomes)
    }

    /// Overwrite every well-known key of `category` with its default.
    ///
    /// Returns the number of keys written; an unknown category writes none.
    pub async fn reset_category_to_defaults(&self, category: &str, modified_by: &str) -> Result<usize, StoreError> {
        let defaults: Vec<_> = defaults::category_defaults(category)
            .map(|d| (d.key, d.value))
            .collect();
        let written = self.set_multiple(defaults, modified_by).await?.len();

        info!("Reset {} settings in category {}", written, category);
        Ok(written)
    }

    /// Store the default of every well-known key that is not stored yet.
    ///
    /// Existing values are left alone. Reads the store directly so a stale
    /// snapshot cannot hide a missing key.
    pub async fn initialize_defaults(&self, modified_by: &str) -> Result<usize, StoreError> {
        let stored: SettingsSnapshot = self.store.load_all_settings().await?.into_iter().collect();
        let missing: Vec<_> = defaults::DEFAULT_SETTINGS
            .iter()
            .filter(|d| stored.get(d.key).is_none())
            .map(|d| (d.key, d.value))
            .collect();

        let written = self.set_multiple(missing, modified_by).await?.len();
        if written > 0 {
            info!("Initialized {} default settings", written);
        }
        Ok(written)
    }

    /// Settings of one category, sorted by key.
    pub async fn category(&self, category: &str) -> Vec<SettingEntry> {
        let snapshot = self.snapshot().await;
        let mut entries: Vec<_> = snapshot
            .entries
            .values()
            .filter(|e| e.category == category)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Every stored setting, sorted by key.
    pub async fn all(&self) -> Vec<SettingEntry> {
        let snapshot = self.snapshot().await;
        let mut entries: Vec<_> = snapshot.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Drop the snapshot and reload it now.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.cache.invalidate();
        let snapshot = self.snapshot().await;
        self.cache.last_refresh().unwrap_or(RefreshOutcome::Loaded {
            entries: snapshot.len(),
        })
    }

    /// Drop the snapshot; the next read reloads.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Outcome of the most recent reload attempt.
    pub fn last_refresh(&self) -> Option<RefreshOutcome> {
        self.cache.last_refresh()
    }

    /// New-row shape for a key: catalog category and type for well-known
    /// keys, `General`/String otherwise. Existing rows keep theirs.
    fn entry_for(key: &str, value: String, modified_by: &str) -> SettingEntry {
        let (category, value_type) = match defaults::lookup(key) {
            Some(d) => (d.category, d.value_type),
            None => (DEFAULT_CATEGORY, SettingValueType::String),
        };
        SettingEntry::new(key, value, value_type, category, Some(modified_by.to_string()))
    }
}
