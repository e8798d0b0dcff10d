//! Lenient timestamp parsing and display helpers
//!
//! The backend is inconsistent about dates: visit tables send RFC 3339
//! timestamps, legacy tables send naive `YYYY-MM-DD HH:MM:SS`, and a few
//! columns are bare dates. Everything is normalized to `DateTime<Utc>`;
//! bare dates become midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse any of the timestamp shapes the backend emits
///
/// # Examples
///
/// ```
/// use hms_export::domain::timestamp::parse_timestamp;
///
/// assert!(parse_timestamp("2024-01-01").is_some());
/// assert!(parse_timestamp("2024-01-01T09:30:00Z").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD`
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM`, or just the date when the time is exactly midnight
pub fn format_display(dt: &DateTime<Utc>) -> String {
    if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
        format_date(dt)
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Serde adapter accepting every shape [`parse_timestamp`] understands
pub mod flexible {
    use super::parse_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use super::parse_timestamp;
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            dt.serialize(serializer)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse_timestamp(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case("2024-01-01" ; "bare date")]
    #[test_case("2024-01-01T00:00:00Z" ; "rfc3339 utc")]
    #[test_case("2024-01-01T02:00:00+02:00" ; "rfc3339 offset")]
    #[test_case("2024-01-01 00:00:00" ; "naive with space")]
    #[test_case("2024-01-01T00:00:00.000" ; "naive with fraction")]
    fn test_parse_timestamp_midnight(raw: &str) {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(raw), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }

    #[test]
    fn test_format_display() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(format_display(&midnight), "2024-03-05");

        let morning = Utc.with_ymd_and_hms(2024, 3, 5, 9, 15, 0).unwrap();
        assert_eq!(format_display(&morning), "2024-03-05 09:15");
    }
}
