use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized timestamp {0:?}, expected ISO-8601 such as 2024-07-05T00:00:00Z")]
pub struct TimestampError(pub String);

/// Parses an ISO-8601 instant. Offsets are normalized to UTC; naive values
/// and bare dates are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let text = raw.trim();

    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Ok(value.with_timezone(&Utc));
    }

    if let Ok(value) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(value.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(TimestampError(raw.to_string()))
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// serde adapter, used as `#[serde(with = "crate::timestamp::iso8601")]`.
pub mod iso8601 {
    use super::*;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_zulu() {
        let parsed = parse_timestamp("2024-07-05T00:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 7, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn normalizes_offsets_to_utc() {
        let parsed = parse_timestamp("2024-07-05T02:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 7, 5, 0, 30, 0).unwrap());
    }

    #[test]
    fn bare_dates_and_naive_times_are_utc() {
        assert_eq!(
            parse_timestamp("2024-07-10").unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-07-10T08:15:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 10, 8, 15, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("next tuesday").unwrap_err();
        assert_eq!(err, TimestampError("next tuesday".to_string()));
    }

    #[test]
    fn formats_with_zulu_suffix() {
        let value = Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(&value), "2024-07-04T12:00:00Z");
    }
}
