//! Store traits consumed by the caches.
//!
//! Both traits upsert by natural key: `key` for settings, `(role, module)`
//! for permissions. Implementations decide how that maps onto storage.

use std::future::Future;

use super::models::{PermissionEntry, Role, SettingEntry};
use crate::error::StoreError;

/// What an upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row existed for the natural key.
    Created,
    /// The row existed and its value changed.
    Updated,
    /// The row existed with the same value; only the audit fields moved.
    Unchanged,
}

/// Key/value settings table.
pub trait SettingsStore: Send + Sync + 'static {
    /// Read every stored setting.
    fn load_all_settings(&self) -> impl Future<Output = Result<Vec<SettingEntry>, StoreError>> + Send;

    /// Insert the entry, or update `value`, `last_modified` and
    /// `modified_by` of the existing row. Category and type of an
    /// existing row are kept.
    fn upsert_setting(
        &self,
        entry: SettingEntry,
    ) -> impl Future<Output = Result<UpsertOutcome, StoreError>> + Send;

    /// Upsert several entries as one transaction.
    fn upsert_settings(
        &self,
        entries: Vec<SettingEntry>,
    ) -> impl Future<Output = Result<Vec<UpsertOutcome>, StoreError>> + Send;
}

/// (role, module) → flags table.
pub trait PermissionStore: Send + Sync + 'static {
    /// Read every stored permission entry.
    fn load_all_permissions(
        &self,
    ) -> impl Future<Output = Result<Vec<PermissionEntry>, StoreError>> + Send;

    /// Read the entries of one role.
    fn load_role_permissions(
        &self,
        role: Role,
    ) -> impl Future<Output = Result<Vec<PermissionEntry>, StoreError>> + Send;

    /// Insert or replace the entry for `(entry.role, entry.module)`.
    fn upsert_permission(
        &self,
        entry: PermissionEntry,
    ) -> impl Future<Output = Result<UpsertOutcome, StoreError>> + Send;
}

/// Merge an incoming setting into the existing row, if any.
pub fn merge_setting(existing: Option<&SettingEntry>, incoming: SettingEntry) -> (SettingEntry, UpsertOutcome) {
    match existing {
        None => (incoming, UpsertOutcome::Created),
        Some(current) => {
            let outcome = if current.value == incoming.value {
                UpsertOutcome::Unchanged
            } else {
                UpsertOutcome::Updated
            };
            let merged = SettingEntry {
                key: current.key.clone(),
                value: incoming.value,
                value_type: current.value_type,
                category: current.category.clone(),
                last_modified: incoming.last_modified,
                modified_by: incoming.modified_by,
            };
            (merged, outcome)
        }
    }
}

/// Classify a permission replacement against the previous row, if any.
pub fn permission_outcome(previous: Option<&PermissionEntry>, incoming: &PermissionEntry) -> UpsertOutcome {
    match previous {
        None => UpsertOutcome::Created,
        Some(p) if p.flags == incoming.flags => UpsertOutcome::Unchanged,
        Some(_) => UpsertOutcome::Updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::SettingValueType;

    #[test]
    fn test_merge_keeps_category_and_type() {
        let existing = SettingEntry::new("ItemsPerPage", "10", SettingValueType::Int, "General", None);
        let incoming = SettingEntry::new("ItemsPerPage", "25", SettingValueType::String, "Other", Some("admin".into()));

        let (merged, outcome) = merge_setting(Some(&existing), incoming);

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(merged.value, "25");
        assert_eq!(merged.value_type, SettingValueType::Int);
        assert_eq!(merged.category, "General");
        assert_eq!(merged.modified_by.as_deref(), Some("admin"));
    }

    #[test]
    fn test_merge_same_value_is_unchanged() {
        let existing = SettingEntry::new("ClinicName", "Acme", SettingValueType::String, "General", None);
        let incoming = SettingEntry::new("ClinicName", "Acme", SettingValueType::String, "General", None);

        let (_, outcome) = merge_setting(Some(&existing), incoming);
        assert_eq!(outcome, UpsertOutcome::Unchanged);
    }

    #[test]
    fn test_merge_without_existing_creates() {
        let incoming = SettingEntry::new("NewKey", "x", SettingValueType::String, "General", None);
        let (merged, outcome) = merge_setting(None, incoming.clone());

        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(merged, incoming);
    }
}
