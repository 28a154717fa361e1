//! Typed coercion of raw setting text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::database::SettingValueType;

/// A type a setting can be read as and written from.
pub trait SettingValue: Sized {
    /// Declared type recorded for well-known keys of this kind.
    const VALUE_TYPE: SettingValueType;

    /// Parse stored text. `None` means the value is malformed for this type.
    fn parse_setting(raw: &str) -> Option<Self>;

    /// Render to the stored textual form.
    fn to_setting(&self) -> String;
}

impl SettingValue for String {
    const VALUE_TYPE: SettingValueType = SettingValueType::String;

    fn parse_setting(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn to_setting(&self) -> String {
        self.clone()
    }
}

impl SettingValue for i64 {
    const VALUE_TYPE: SettingValueType = SettingValueType::Int;

    fn parse_setting(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn to_setting(&self) -> String {
        self.to_string()
    }
}

impl SettingValue for i32 {
    const VALUE_TYPE: SettingValueType = SettingValueType::Int;

    fn parse_setting(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn to_setting(&self) -> String {
        self.to_string()
    }
}

impl SettingValue for bool {
    const VALUE_TYPE: SettingValueType = SettingValueType::Bool;

    fn parse_setting(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn to_setting(&self) -> String {
        self.to_string()
    }
}

impl SettingValue for DateTime<Utc> {
    const VALUE_TYPE: SettingValueType = SettingValueType::DateTime;

    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare dates (midnight UTC).
    fn parse_setting(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    fn to_setting(&self) -> String {
        self.to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_int() {
        assert_eq!(i64::parse_setting("25"), Some(25));
        assert_eq!(i64::parse_setting(" 7 "), Some(7));
        assert_eq!(i32::parse_setting("-3"), Some(-3));
        assert_eq!(i64::parse_setting("ten"), None);
        assert_eq!(i32::parse_setting("99999999999"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(bool::parse_setting("True"), Some(true));
        assert_eq!(bool::parse_setting("false"), Some(false));
        assert_eq!(bool::parse_setting("yes"), None);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        assert_eq!(DateTime::<Utc>::parse_setting("2024-03-01T09:30:00Z"), Some(expected));
        assert_eq!(DateTime::<Utc>::parse_setting("2024-03-01 09:30:00"), Some(expected));
        assert_eq!(
            DateTime::<Utc>::parse_setting("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(DateTime::<Utc>::parse_setting("March 1st"), None);
    }

    #[test]
    fn test_datetime_written_form_reads_back() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(DateTime::<Utc>::parse_setting(&at.to_setting()), Some(at));
    }
}
