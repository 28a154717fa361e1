//! Access services - both caches wired over one backend.

use tracing::info;

use crate::cache::CacheConfig;
use crate::config::Config;
use crate::database::{Database, MemoryStore, PermissionRepository, PermissionStore, SettingsRepository, SettingsStore};
use crate::error::StoreError;
use crate::permissions::PermissionCache;
use crate::settings::SettingsCache;

/// Settings and permission caches, built once per process and shared.
///
/// Each cache keeps its own snapshot and its own five-minute clock.
pub struct AccessServices<S: SettingsStore, P: PermissionStore> {
    pub settings: SettingsCache<S>,
    pub permissions: PermissionCache<P>,
}

impl<S: SettingsStore, P: PermissionStore> AccessServices<S, P> {
    pub fn new(settings_store: S, permission_store: P, config: CacheConfig) -> Self {
        Self {
            settings: SettingsCache::new(settings_store, config.clone()),
            permissions: PermissionCache::new(permission_store, config),
        }
    }

    /// Seed well-known settings and default role templates where missing.
    ///
    /// Returns (settings written, permission entries written).
    pub async fn initialize_defaults(&self, modified_by: &str) -> Result<(usize, usize), StoreError> {
        let settings = self.settings.initialize_defaults(modified_by).await?;
        let permissions = self.permissions.initialize_defaults(modified_by).await?;
        info!("Defaults initialized: {} settings, {} permissions", settings, permissions);
        Ok((settings, permissions))
    }
}

impl AccessServices<SettingsRepository, PermissionRepository> {
    /// Services backed by the MongoDB collections named in `config`.
    ///
    /// Ensures the natural-key unique indexes before returning.
    pub async fn mongo(db: &Database, config: &Config) -> Result<Self, StoreError> {
        let settings = SettingsRepository::new(db, &config.settings_collection);
        let permissions = PermissionRepository::new(db, &config.permissions_collection);
        settings.ensure_indexes().await?;
        permissions.ensure_indexes().await?;

        Ok(Self::new(settings, permissions, CacheConfig::default()))
    }
}

impl AccessServices<MemoryStore, MemoryStore> {
    /// Services over one fresh in-memory store.
    pub fn in_memory(config: CacheConfig) -> Self {
        let store = MemoryStore::new();
        Self::new(store.clone(), store, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Capability, Module, Role};

    #[tokio::test]
    async fn test_initialize_defaults_seeds_both_tables() {
        let services = AccessServices::in_memory(CacheConfig::default());

        let (settings, permissions) = services.initialize_defaults("system").await.unwrap();

        assert_eq!(settings, crate::settings::DEFAULT_SETTINGS.len());
        assert_eq!(permissions, 24);
        assert_eq!(services.settings.get_int("ItemsPerPage", 0).await, 10);
        assert!(
            services
                .permissions
                .has_permission(Role::Administrator, Module::SystemSettings, Capability::Edit)
                .await
        );
    }

    #[tokio::test]
    async fn test_settings_write_keeps_permission_snapshot() {
        let services = AccessServices::in_memory(CacheConfig::default());
        let store = services.settings.store().clone();
        services.settings.get_int("ItemsPerPage", 10).await;
        services.permissions.has_permission(Role::Doctor, Module::Reports, Capability::View).await;
        assert_eq!(store.load_count(), 2);

        services.settings.set_int("ItemsPerPage", 30, "admin").await.unwrap();
        assert_eq!(services.settings.get_int("ItemsPerPage", 10).await, 30);
        services.permissions.has_permission(Role::Doctor, Module::Reports, Capability::View).await;

        assert_eq!(store.load_count(), 3);
    }
}
