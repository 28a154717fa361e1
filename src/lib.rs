//! Clinic Access - role permissions and system settings for the clinic suite.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - Store traits, MongoDB repositories and an in-memory store
//! - `cache` - TTL snapshot caching with Moka
//! - `settings` - Typed settings reads and writes with caching
//! - `permissions` - Role-based access evaluation with caching
//! - `services` - Both caches wired over one backend

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod permissions;
pub mod services;
pub mod settings;

pub use error::{ParseError, StoreError};
pub use services::AccessServices;
