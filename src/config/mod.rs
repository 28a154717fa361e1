//! Configuration module.
//!
//! Loads configuration from environment variables.

use std::env;

use anyhow::Context;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Collection holding one document per setting key.
    pub settings_collection: String,

    /// Collection holding one document per (role, module) pair.
    pub permissions_collection: String,

    /// Name recorded as `modified_by` for maintenance writes.
    pub operator: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns error if `MONGODB_URI` is not set.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            mongodb_uri: env::var("MONGODB_URI").context("MONGODB_URI must be set")?,
            mongodb_database: var_or("MONGODB_DATABASE", "clinic"),
            settings_collection: var_or("SETTINGS_COLLECTION", "system_settings"),
            permissions_collection: var_or("PERMISSIONS_COLLECTION", "role_permissions"),
            operator: var_or("ACCESS_OPERATOR", "system"),
        })
    }
}

/// Read a variable, treating unset and blank the same.
fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}
