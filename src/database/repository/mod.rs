//! Repository module - MongoDB implementations of the store traits.

mod permission_repository;
mod settings_repository;

pub use permission_repository::PermissionRepository;
pub use settings_repository::SettingsRepository;
