//! Well-known settings and their defaults.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::database::SettingValueType;
use crate::database::SettingValueType as Ty;

/// A well-known key with its category, type and default text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSetting {
    pub category: &'static str,
    pub key: &'static str,
    pub value_type: SettingValueType,
    pub value: &'static str,
}

const fn setting(
    category: &'static str,
    key: &'static str,
    value_type: SettingValueType,
    value: &'static str,
) -> DefaultSetting {
    DefaultSetting {
        category,
        key,
        value_type,
        value,
    }
}

pub const DEFAULT_SETTINGS: &[DefaultSetting] = &[
    setting("General", "ClinicName", Ty::String, "Clinic"),
    setting("General", "ClinicAddress", Ty::String, ""),
    setting("General", "ClinicPhone", Ty::String, ""),
    setting("General", "ItemsPerPage", Ty::Int, "10"),
    setting("General", "DateFormat", Ty::String, "dd/MM/yyyy"),
    setting("Appointments", "DefaultAppointmentDuration", Ty::Int, "30"),
    setting("Appointments", "WorkingHoursStart", Ty::String, "08:00"),
    setting("Appointments", "WorkingHoursEnd", Ty::String, "17:00"),
    setting("Appointments", "AllowDoubleBooking", Ty::Bool, "false"),
    setting("Appointments", "ReminderHoursBefore", Ty::Int, "24"),
    setting("Inventory", "LowStockThreshold", Ty::Int, "10"),
    setting("Inventory", "ExpiryWarningDays", Ty::Int, "30"),
    setting("Security", "SessionTimeoutMinutes", Ty::Int, "30"),
    setting("Security", "MaxLoginAttempts", Ty::Int, "5"),
    setting("Security", "PasswordMinLength", Ty::Int, "8"),
    setting("Backup", "AutoBackupEnabled", Ty::Bool, "false"),
    setting("Backup", "BackupRetentionDays", Ty::Int, "30"),
];

static BY_KEY: Lazy<HashMap<&'static str, &'static DefaultSetting>> =
    Lazy::new(|| DEFAULT_SETTINGS.iter().map(|d| (d.key, d)).collect());

/// Catalog entry for a key, if it is well-known.
pub fn lookup(key: &str) -> Option<&'static DefaultSetting> {
    BY_KEY.get(key).copied()
}

/// Well-known keys of one category, in catalog order.
pub fn category_defaults(category: &str) -> impl Iterator<Item = &'static DefaultSetting> + '_ {
    DEFAULT_SETTINGS.iter().filter(move |d| d.category == category)
}

/// Distinct categories in catalog order.
pub fn categories() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for d in DEFAULT_SETTINGS {
        if !seen.contains(&d.category) {
            seen.push(d.category);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        assert_eq!(BY_KEY.len(), DEFAULT_SETTINGS.len());
    }

    #[test]
    fn test_lookup_is_exact_match() {
        assert_eq!(lookup("ItemsPerPage").map(|d| d.value), Some("10"));
        assert!(lookup("itemsperpage").is_none());
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            categories(),
            vec!["General", "Appointments", "Inventory", "Security", "Backup"]
        );
        assert_eq!(category_defaults("Security").count(), 3);
        assert_eq!(category_defaults("Billing").count(), 0);
    }

    #[test]
    fn test_defaults_parse_as_declared_type() {
        use crate::settings::SettingValue;

        for d in DEFAULT_SETTINGS {
            let ok = match d.value_type {
                SettingValueType::Int => i64::parse_setting(d.value).is_some(),
                SettingValueType::Bool => bool::parse_setting(d.value).is_some(),
                SettingValueType::DateTime => {
                    chrono::DateTime::<chrono::Utc>::parse_setting(d.value).is_some()
                }
                SettingValueType::String => true,
            };
            assert!(ok, "default for {} does not parse", d.key);
        }
    }
}
