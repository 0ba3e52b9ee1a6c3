//! The single date-time wire format: `yyyy-MM-dd HH:mm:ss`, timezone-naive.
//!
//! Use the serde adapters on DTO fields:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct EventDto {
//!     #[serde(with = "axum_helpers::datetime::format")]
//!     event_date: NaiveDateTime,
//!     #[serde(with = "axum_helpers::datetime::option_format", default)]
//!     published_on: Option<NaiveDateTime>,
//! }
//! ```

use chrono::{NaiveDateTime, Timelike, Utc};

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a wire timestamp. The error carries the offending input.
pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(|e| {
        format!(
            "'{}' does not match pattern yyyy-MM-dd HH:mm:ss: {}",
            value, e
        )
    })
}

pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Current UTC wall clock truncated to whole seconds, matching the wire precision.
pub fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

pub mod format {
    use super::{DATE_TIME_FORMAT, parse_date_time};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(DATE_TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_time(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod option_format {
    use super::{DATE_TIME_FORMAT, parse_date_time};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(&v.format(DATE_TIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_date_time(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "format")]
        at: NaiveDateTime,
        #[serde(with = "option_format", default)]
        maybe: Option<NaiveDateTime>,
    }

    #[test]
    fn test_parse_and_format_round_trip() {
        let parsed = parse_date_time("2024-01-01 13:05:09").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(format_date_time(&parsed), "2024-01-01 13:05:09");
    }

    #[test]
    fn test_iso_format_is_rejected() {
        let err = parse_date_time("2024-01-01T13:05:09").unwrap_err();
        assert!(err.contains("2024-01-01T13:05:09"));
        assert!(parse_date_time("01.01.2024 10:00").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_rejected() {
        assert!(parse_date_time(" 2024-01-01 00:00:00 ").is_err());
        assert!(parse_date_time("2024-01-01 00:00:00\n").is_err());
    }

    #[test]
    fn test_serde_adapters() {
        let json = r#"{"at":"2030-06-15 18:30:00"}"#;
        let stamped: Stamped = serde_json::from_str(json).unwrap();
        assert!(stamped.maybe.is_none());

        let out = serde_json::to_value(&stamped).unwrap();
        assert_eq!(out["at"], "2030-06-15 18:30:00");
        assert!(out["maybe"].is_null());

        assert!(serde_json::from_str::<Stamped>(r#"{"at":"tomorrow"}"#).is_err());
    }

    #[test]
    fn test_now_has_whole_seconds() {
        assert_eq!(now().nanosecond(), 0);
    }
}
