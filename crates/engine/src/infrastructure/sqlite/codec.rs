//! Column encoding shared by the SQLite repositories.
//!
//! Animation frames live in a JSON text column; this is the only place that
//! knows that.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::infrastructure::ports::RepoError;

pub fn encode_frames(frames: &[String]) -> Result<String, RepoError> {
    serde_json::to_string(frames).map_err(RepoError::serialization)
}

pub fn decode_frames(raw: &str) -> Result<Vec<String>, RepoError> {
    serde_json::from_str(raw).map_err(RepoError::serialization)
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
pub(crate) fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_time(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("bad timestamp '{raw}': {e}")))
}

pub(crate) fn decode<T>(column: &'static str, raw: &str) -> Result<T, RepoError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| RepoError::serialization(format!("bad {column} '{raw}': {e}")))
}

pub(crate) fn decode_opt<T>(column: &'static str, raw: Option<String>) -> Result<Option<T>, RepoError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|raw| decode(column, &raw)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_keep_order_and_whitespace() {
        let frames = vec!["  /\\  \n /__\\ ".to_string(), "\"quoted\"".to_string()];
        let raw = encode_frames(&frames).unwrap();
        assert!(raw.starts_with('['));
        assert_eq!(decode_frames(&raw).unwrap(), frames);
    }

    #[test]
    fn corrupt_frames_are_a_serialization_error() {
        assert!(matches!(
            decode_frames("{not a list"),
            Err(RepoError::Serialization(_))
        ));
    }

    #[test]
    fn timestamps_sort_as_text() {
        let early = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.25Z")
            .unwrap()
            .with_timezone(&Utc)
            + chrono::Duration::seconds(1);
        assert!(encode_time(early) < encode_time(late));
        assert_eq!(decode_time(&encode_time(early)).unwrap(), early);
    }
}
