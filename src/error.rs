//! Error types.

use thiserror::Error;

/// Failure talking to the settings or permission store.
///
/// Read paths recover from these locally; write paths return them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

/// A role, module or capability name outside the fixed enumerations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),
}
