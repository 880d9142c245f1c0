// src/dates.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days covered by a range, rounding any partial day up. Order of the
/// endpoints does not matter.
pub fn day_count(begin: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - begin).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

pub fn is_inverted(begin: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    end < begin
}

/// Parses backend timestamps. Accepts RFC 3339 as well as the offset-less
/// ISO form the API emits for local date-times, which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Wire form used when sending dates: `2024-01-04T00:00:00.000Z`.
pub fn to_wire(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Display form for request lists, e.g. `Jan 4, 2024, 12:00 AM`.
pub fn format_display(value: Option<&DateTime<Utc>>) -> String {
    match value {
        Some(value) => value.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => "N/A".to_string(),
    }
}

/// Display form for log tables, `YYYY-MM-DD HH:MM:SS` or just the date.
pub fn format_log_time(value: Option<&DateTime<Utc>>, show_time: bool) -> String {
    match value {
        Some(value) if show_time => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        Some(value) => value.format("%Y-%m-%d").to_string(),
        None => "N/A".to_string(),
    }
}

/// Serde adapter for required timestamps.
pub mod flexible {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_wire(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("unrecognised timestamp '{}'", raw)))
    }
}

/// Serde adapter for optional timestamps; `null` and a missing field both
/// map to `None` (pair with `#[serde(default)]`).
pub mod flexible_option {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&super::to_wire(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unrecognised timestamp '{}'", raw))),
        }
    }
}
