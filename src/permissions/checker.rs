//! Permission checker with caching.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::levels::{AccessLevel, role_template};
use crate::cache::{CacheConfig, RefreshOutcome, Snapshot, SnapshotCache};
use crate::database::{Capability, Module, PermissionEntry, PermissionFlags, PermissionStore, Role, UpsertOutcome};
use crate::error::StoreError;

/// Every stored permission entry keyed by (role, module).
#[derive(Debug, Default)]
pub struct PermissionSnapshot {
    entries: HashMap<(Role, Module), PermissionEntry>,
}

impl PermissionSnapshot {
    pub fn get(&self, role: Role, module: Module) -> Option<&PermissionEntry> {
        self.entries.get(&(role, module))
    }
}

impl Snapshot for PermissionSnapshot {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<PermissionEntry> for PermissionSnapshot {
    fn from_iter<I: IntoIterator<Item = PermissionEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|e| ((e.role, e.module), e)).collect(),
        }
    }
}

/// Role-based access evaluation over a cached permission table.
///
/// Lookups are fail-closed: a (role, module) pair with no stored entry
/// grants nothing. Writes invalidate this instance immediately. Other
/// processes pick a change up when their snapshot expires, so a revoked
/// permission may still be honoured elsewhere for up to five minutes.
pub struct PermissionCache<P: PermissionStore> {
    store: P,
    cache: SnapshotCache<PermissionSnapshot>,
}

impl<P: PermissionStore> PermissionCache<P> {
    pub fn new(store: P, config: CacheConfig) -> Self {
        Self {
            store,
            cache: SnapshotCache::new("role_permissions", config),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &P {
        &self.store
    }

    async fn snapshot(&self) -> Arc<PermissionSnapshot> {
        self.cache
            .get_or_load(|| async {
                let entries = self.store.load_all_permissions().await?;
                Ok::<_, StoreError>(entries.into_iter().collect::<PermissionSnapshot>())
            })
            .await
    }

    /// Stored flags of a pair; all false when nothing is stored.
    pub async fn flags(&self, role: Role, module: Module) -> PermissionFlags {
        self.snapshot()
            .await
            .get(role, module)
            .map(|e| e.flags)
            .unwrap_or(PermissionFlags::NONE)
    }

    /// Whether `role` may perform `capability` on `module`.
    pub async fn has_permission(&self, role: Role, module: Module, capability: Capability) -> bool {
        let allowed = self.flags(role, module).await.allows(capability);
        debug!("Permission check {}/{}/{}: {}", role, module, capability, allowed);
        allowed
    }

    /// Name-based variant of [`has_permission`](Self::has_permission).
    ///
    /// Any name outside the fixed enumerations is denied.
    pub async fn has_permission_named(&self, role: &str, module: &str, capability: &str) -> bool {
        let parsed = (role.parse::<Role>(), module.parse::<Module>(), capability.parse::<Capability>());
        match parsed {
            (Ok(role), Ok(module), Ok(capability)) => self.has_permission(role, module, capability).await,
            _ => {
                debug!("Permission check with unknown name {}/{}/{}: denied", role, module, capability);
                false
            }
        }
    }

    /// Store `flags` for (role, module) and invalidate the cache.
    pub async fn update_permission(
        &self,
        role: Role,
        module: Module,
        flags: PermissionFlags,
        modified_by: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        let entry = PermissionEntry::new(role, module, flags, Some(modified_by.to_string()));
        let outcome = self.store.upsert_permission(entry).await?;
        self.cache.invalidate();

        info!("Permission {}/{} set by {}: {:?}", role, module, modified_by, outcome);
        Ok(outcome)
    }

    /// Apply a named preset. Unknown preset names revoke everything.
    pub async fn set_access_level(
        &self,
        role: Role,
        module: Module,
        level: &str,
        modified_by: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        let level = AccessLevel::from_name(level);
        self.update_permission(role, module, level.flags(), modified_by).await
    }

    /// Overwrite every module of `role` with its default template.
    ///
    /// Returns the number of entries written.
    pub async fn reset_role_to_default(&self, role: Role, modified_by: &str) -> Result<usize, StoreError> {
        let written = self.write_template(role, modified_by).await;
        // Earlier modules may have landed even if a later one failed.
        self.cache.invalidate();

        let written = written?;
        info!("Reset {} to default permissions ({} modules)", role, written);
        Ok(written)
    }

    /// Modules `role` can view, read straight from the store.
    ///
    /// A store failure yields the empty set.
    pub async fn accessible_modules(&self, role: Role) -> BTreeSet<Module> {
        match self.store.load_role_permissions(role).await {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| e.flags.view)
                .map(|e| e.module)
                .collect(),
            Err(e) => {
                warn!("Failed to load permissions of {}: {}", role, e);
                BTreeSet::new()
            }
        }
    }

    /// Flags of every module for `role`, in module order.
    pub async fn role_matrix(&self, role: Role) -> Vec<(Module, PermissionFlags)> {
        let snapshot = self.snapshot().await;
        Module::ALL
            .into_iter()
            .map(|module| {
                let flags = snapshot
                    .get(role, module)
                    .map(|e| e.flags)
                    .unwrap_or(PermissionFlags::NONE);
                (module, flags)
            })
            .collect()
    }

    /// Preset matching the stored flags, or `None` for a custom mix.
    pub async fn access_level(&self, role: Role, module: Module) -> Option<AccessLevel> {
        AccessLevel::from_flags(self.flags(role, module).await)
    }

    /// Write the default template of every role that has no stored entries.
    ///
    /// Returns the number of entries written.
    pub async fn initialize_defaults(&self, modified_by: &str) -> Result<usize, StoreError> {
        let stored: PermissionSnapshot = self.store.load_all_permissions().await?.into_iter().collect();
        let mut written = 0;

        for role in Role::ALL {
            let has_any = Module::ALL.iter().any(|m| stored.get(role, *m).is_some());
            if has_any {
                continue;
            }
            match self.write_template(role, modified_by).await {
                Ok(n) => written += n,
                Err(e) => {
                    self.cache.invalidate();
                    return Err(e);
                }
            }
        }

        if written > 0 {
            self.cache.invalidate();
            info!("Initialized {} default permission entries", written);
        }
        Ok(written)
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

    async fn write_template(&self, role: Role, modified_by: &str) -> Result<usize, StoreError> {
        let mut written = 0;
        for (module, flags) in role_template(role) {
            let entry = PermissionEntry::new(role, module, flags, Some(modified_by.to_string()));
            self.store.upsert_permission(entry).await?;
            written += 1;
        }
        Ok(written)
    }
}
