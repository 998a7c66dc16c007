// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, SecondsFormat, TimeZone, Utc};

/// Label format for a session that is alone on its calendar date.
pub const DATE_LABEL_FORMAT: &str = "%d/%m/%Y";
/// Label format for sessions sharing a calendar date with another session.
pub const DATE_TIME_LABEL_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z`
/// suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build a display offset from minutes east of UTC, falling back to UTC.
pub fn display_offset(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Calendar date of a timestamp in the display offset.
pub fn local_date(date: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    date.with_timezone(&offset).date_naive()
}

/// UTC bounds `[start, end]` of the display-offset day containing `date`.
///
/// `end` is the last whole second of that day.
pub fn day_bounds(date: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = local_date(date, offset);
    let start = day
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| offset.from_local_datetime(&midnight).single())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(date);
    (start, start + Duration::days(1) - Duration::seconds(1))
}

/// Format a timestamp as a chart label in the display offset.
pub fn format_label(date: DateTime<Utc>, offset: FixedOffset, with_time: bool) -> String {
    let local = date.with_timezone(&offset);
    if with_time {
        local.format(DATE_TIME_LABEL_FORMAT).to_string()
    } else {
        local.format(DATE_LABEL_FORMAT).to_string()
    }
}

/// Serde adapter storing timestamps as millisecond-precision RFC3339 strings.
///
/// Fixed-width strings keep Firestore's lexicographic ordering chronological.
pub mod rfc3339 {
    use super::format_utc_rfc3339;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_utc_rfc3339(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    /// Same encoding for optional timestamps (`None` is stored as null).
    pub mod option {
        use super::super::format_utc_rfc3339;
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => serializer.serialize_some(&format_utc_rfc3339(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|d| d.with_timezone(&Utc))
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_format_utc_rfc3339_keeps_milliseconds() {
        let date = parse("2024-03-05T07:08:09.123456Z");
        assert_eq!(format_utc_rfc3339(date), "2024-03-05T07:08:09.123Z");
        assert_eq!(
            format_utc_rfc3339(parse("2024-03-05T07:08:09Z")),
            "2024-03-05T07:08:09.000Z"
        );
    }

    #[test]
    fn test_formatted_timestamps_sort_chronologically() {
        let first = format_utc_rfc3339(parse("2024-03-05T07:08:09.900Z"));
        let second = format_utc_rfc3339(parse("2024-03-05T07:08:10.100Z"));
        let earlier = format_utc_rfc3339(parse("2024-03-05T07:08:09.100Z"));
        assert!(earlier < first);
        assert!(first < second);
    }

    #[test]
    fn test_day_bounds_utc() {
        let (start, end) = day_bounds(parse("2024-03-05T18:30:00Z"), display_offset(0));
        assert_eq!(start, parse("2024-03-05T00:00:00Z"));
        assert_eq!(end, parse("2024-03-05T23:59:59Z"));
    }

    #[test]
    fn test_day_bounds_respects_offset() {
        // 23:30 UTC is already the next day at UTC+2
        let (start, end) = day_bounds(parse("2024-03-05T23:30:00Z"), display_offset(120));
        assert_eq!(start, parse("2024-03-05T22:00:00Z"));
        assert_eq!(end, parse("2024-03-06T21:59:59Z"));
    }

    #[test]
    fn test_format_label() {
        let date = parse("2024-03-05T07:08:09Z");
        assert_eq!(format_label(date, display_offset(0), false), "05/03/2024");
        assert_eq!(format_label(date, display_offset(60), true), "05/03/2024 08:08");
    }

    #[test]
    fn test_invalid_offset_falls_back_to_utc() {
        assert_eq!(display_offset(100_000), Utc.fix());
        assert_eq!(display_offset(i32::MAX), Utc.fix());
        assert_eq!(display_offset(i32::MIN), Utc.fix());
    }
}
