//! Common validation utilities.

use chrono::{TimeZone, Utc};
use validator::ValidationError;

/// Maximum allowed future timestamp tolerance in seconds (5 minutes for clock skew).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Maximum age of a location timestamp in days.
const MAX_TIMESTAMP_AGE_DAYS: i64 = 7;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lng: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lng) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that a location timestamp (milliseconds since epoch) is plausible.
/// - Must not be more than 5 minutes in the future (allows for clock skew)
/// - Must not be older than 7 days
pub fn validate_timestamp(timestamp_millis: i64) -> Result<(), ValidationError> {
    let now = Utc::now();

    let timestamp = match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(ts) => ts,
        None => {
            let mut err = ValidationError::new("timestamp_invalid");
            err.message = Some("Invalid timestamp format".into());
            return Err(err);
        }
    };

    let future_limit = now + chrono::Duration::seconds(MAX_FUTURE_TOLERANCE_SECS);
    if timestamp > future_limit {
        let mut err = ValidationError::new("timestamp_future");
        err.message = Some("Timestamp cannot be in the future".into());
        return Err(err);
    }

    let past_limit = now - chrono::Duration::days(MAX_TIMESTAMP_AGE_DAYS);
    if timestamp < past_limit {
        let mut err = ValidationError::new("timestamp_old");
        err.message = Some("Timestamp cannot be older than 7 days".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_latitude_error_message() {
        let err = validate_latitude(100.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Latitude must be between -90 and 90"
        );
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_timestamp_now() {
        assert!(validate_timestamp(Utc::now().timestamp_millis()).is_ok());
    }

    #[test]
    fn test_validate_timestamp_far_future() {
        let future = Utc::now().timestamp_millis() + 3_600_000;
        assert!(validate_timestamp(future).is_err());
    }

    #[test]
    fn test_validate_timestamp_small_skew_allowed() {
        let skewed = Utc::now().timestamp_millis() + 60_000;
        assert!(validate_timestamp(skewed).is_ok());
    }

    #[test]
    fn test_validate_timestamp_too_old() {
        let old = Utc::now().timestamp_millis() - 8 * 24 * 3_600_000;
        assert!(validate_timestamp(old).is_err());
    }
}
