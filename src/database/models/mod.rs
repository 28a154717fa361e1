//! Database models.

pub mod permission;
pub mod setting;

pub use permission::{Capability, Module, PermissionEntry, PermissionFlags, Role};
pub use setting::{DEFAULT_CATEGORY, SettingEntry, SettingValueType};
