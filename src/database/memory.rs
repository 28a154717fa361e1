//! In-memory store.
//!
//! Implements both store traits without a database. Clones share the
//! same tables, so two caches built over clones behave like two
//! processes talking to one database.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use super::models::{Module, PermissionEntry, Role, SettingEntry};
use super::store::{PermissionStore, SettingsStore, UpsertOutcome, merge_setting, permission_outcome};
use crate::error::StoreError;

/// Shared in-memory settings and permission tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    settings: Arc<RwLock<BTreeMap<String, SettingEntry>>>,
    permissions: Arc<DashMap<(Role, Module), PermissionEntry>>,
    offline: Arc<AtomicBool>,
    loads: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store becoming unreachable (or reachable again).
    ///
    /// While offline every operation fails with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        debug!("Memory store offline: {}", offline);
    }

    /// Number of full-table loads served so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    async fn load_all_settings(&self) -> Result<Vec<SettingEntry>, StoreError> {
        self.ensure_online()?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.settings.read().values().cloned().collect())
    }

    async fn upsert_setting(&self, entry: SettingEntry) -> Result<UpsertOutcome, StoreError> {
        self.ensure_online()?;
        let mut settings = self.settings.write();
        let (merged, outcome) = merge_setting(settings.get(&entry.key), entry);
        settings.insert(merged.key.clone(), merged);
        Ok(outcome)
    }

    async fn upsert_settings(&self, entries: Vec<SettingEntry>) -> Result<Vec<UpsertOutcome>, StoreError> {
        self.ensure_online()?;
        // One write guard for the whole batch keeps it atomic for readers.
        let mut settings = self.settings.write();
        let outcomes = entries
            .into_iter()
            .map(|entry| {
                let (merged, outcome) = merge_setting(settings.get(&entry.key), entry);
                settings.insert(merged.key.clone(), merged);
                outcome
            })
            .collect();
        Ok(outcomes)
    }
}

impl PermissionStore for MemoryStore {
    async fn load_all_permissions(&self) -> Result<Vec<PermissionEntry>, StoreError> {
        self.ensure_online()?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.permissions.iter().map(|e| e.value().clone()).collect())
    }

    async fn load_role_permissions(&self, role: Role) -> Result<Vec<PermissionEntry>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .permissions
            .iter()
            .filter(|e| e.key().0 == role)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn upsert_permission(&self, entry: PermissionEntry) -> Result<UpsertOutcome, StoreError> {
        self.ensure_online()?;
        let previous = self.permissions.insert((entry.role, entry.module), entry.clone());
        Ok(permission_outcome(previous.as_ref(), &entry))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("settings", &self.settings.read().len())
            .field("permissions", &self.permissions.len())
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish()
    }
}
