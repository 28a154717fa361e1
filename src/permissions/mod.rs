//! Permission system for checking what a role may do.
//!
//! This module answers "can role R perform capability C on module M?"
//! from a cached copy of the role permission table.
//!
//! ## Features
//!
//! - Cached permission lookups (one table load per five minutes)
//! - Fail-closed evaluation for unknown pairs and names
//! - Named access-level presets and default role templates
//!
//! ## Usage
//!
//! ```ignore
//! let perms = PermissionCache::new(store, CacheConfig::default());
//!
//! if perms.has_permission(Role::Doctor, Module::Prescriptions, Capability::Edit).await {
//!     // ...
//! }
//!
//! perms.set_access_level(Role::Receptionist, Module::Reports, "View Only", "admin").await?;
//! ```

mod checker;
mod levels;

pub use checker::{PermissionCache, PermissionSnapshot};
pub use levels::{ACCESS_LEVELS, AccessLevel, role_template};
