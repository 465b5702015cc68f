//! Cursor-based pagination utilities.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error type for cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid ID in cursor")]
    InvalidId,
}

/// Encodes a cursor from timestamp and row ID.
///
/// The cursor format is: base64(RFC3339_timestamp:id). The composite cursor
/// keeps pagination stable across rows with identical timestamps.
pub fn encode_cursor(occurred_at: DateTime<Utc>, id: i64) -> String {
    let raw = format!(
        "{}:{}",
        occurred_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        id
    );
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Decodes a cursor into timestamp and row ID.
pub fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, i64), CursorError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;

    let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

    // Split on last colon (the timestamp itself contains colons)
    let colon_pos = s.rfind(':').ok_or(CursorError::InvalidFormat)?;
    let timestamp_str = &s[..colon_pos];
    let id_str = &s[colon_pos + 1..];

    let id: i64 = id_str.parse().map_err(|_| CursorError::InvalidId)?;

    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .map_err(|_| CursorError::InvalidTimestamp)?
        .with_timezone(&Utc);

    Ok((timestamp, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_encode_decode_cursor_roundtrip() {
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap();
        let id = 42_i64;

        let cursor = encode_cursor(timestamp, id);
        let (decoded_ts, decoded_id) = decode_cursor(&cursor).unwrap();

        assert_eq!(decoded_ts, timestamp);
        assert_eq!(decoded_id, id);
    }

    #[test]
    fn test_encode_decode_with_microseconds() {
        let timestamp = Utc
            .with_ymd_and_hms(2026, 6, 15, 14, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_000)
            .unwrap();

        let cursor = encode_cursor(timestamp, 999_999);
        let (decoded_ts, decoded_id) = decode_cursor(&cursor).unwrap();

        assert_eq!(decoded_ts, timestamp);
        assert_eq!(decoded_id, 999_999);
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert!(matches!(
            decode_cursor("not base64!!!"),
            Err(CursorError::InvalidEncoding)
        ));
    }

    #[test]
    fn test_decode_missing_separator() {
        let cursor = URL_SAFE_NO_PAD.encode(b"no-separator-here");
        assert!(matches!(
            decode_cursor(&cursor),
            Err(CursorError::InvalidId) | Err(CursorError::InvalidFormat)
        ));
    }

    #[test]
    fn test_decode_bad_id() {
        let cursor = URL_SAFE_NO_PAD.encode(b"2026-01-01T00:00:00Z:abc");
        assert!(matches!(decode_cursor(&cursor), Err(CursorError::InvalidId)));
    }
}
