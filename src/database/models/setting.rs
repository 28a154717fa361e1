//! System setting model.
//!
//! One row per configuration key. Values are stored as raw text and
//! coerced to the declared type when read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to keys that are not part of the well-known catalog.
pub const DEFAULT_CATEGORY: &str = "General";

/// Declared type of a stored setting value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum SettingValueType {
    #[default]
    String,
    Int,
    Bool,
    DateTime,
}

impl SettingValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::DateTime => "DateTime",
        }
    }
}

/// A stored configuration value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingEntry {
    /// Unique, case-sensitive key
    pub key: String,

    /// Raw textual value
    pub value: String,

    /// Declared value type
    #[serde(default)]
    pub value_type: SettingValueType,

    /// Grouping shown on the settings screens
    #[serde(default = "default_category")]
    pub category: String,

    pub last_modified: DateTime<Utc>,

    #[serde(default)]
    pub modified_by: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl SettingEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        value_type: SettingValueType,
        category: impl Into<String>,
        modified_by: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            value_type,
            category: category.into(),
            last_modified: Utc::now(),
            modified_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_category_defaults_to_general() {
        let json = r#"{"key":"ClinicName","value":"Acme","last_modified":"2024-01-01T00:00:00Z"}"#;
        let entry: SettingEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.category, DEFAULT_CATEGORY);
        assert_eq!(entry.value_type, SettingValueType::String);
        assert!(entry.modified_by.is_none());
    }
}
