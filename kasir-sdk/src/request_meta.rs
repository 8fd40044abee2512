//! Request identifiers and timestamps for outbound gateway calls.

use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

/// Metadata that identifies one signed gateway call.
///
/// Built fresh for every outbound request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub client_id: String,
    pub request_id: String,
    pub request_timestamp: String,
    pub request_target: String,
}

impl RequestMeta {
    /// Metadata for a call made right now: a fresh v4 request id and the
    /// current UTC time.
    pub fn now(client_id: impl Into<String>, request_target: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            request_id: new_request_id(),
            request_timestamp: request_timestamp(),
            request_target: request_target.into(),
        }
    }
}

/// A unique request identifier (UUID v4, hyphenated).
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// The current UTC time as `YYYY-MM-DDTHH:mm:ssZ`.
pub fn request_timestamp() -> String {
    format_request_timestamp(OffsetDateTime::now_utc())
}

/// Format `at` in UTC with whole seconds and a `Z` suffix.
///
/// Fractional seconds are dropped, not rounded, so consecutive calls never
/// go backwards.
pub fn format_request_timestamp(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, PrimitiveDateTime, Time};

    fn at(h: u8, m: u8, s: u8, nanos: u32, offset_hours: i8) -> OffsetDateTime {
        let date = Date::from_calendar_date(2026, Month::February, 8).unwrap();
        let time = Time::from_hms_nano(h, m, s, nanos).unwrap();
        PrimitiveDateTime::new(date, time)
            .assume_offset(UtcOffset::from_hms(offset_hours, 0, 0).unwrap())
    }

    #[test]
    fn test_fraction_is_truncated() {
        assert_eq!(
            format_request_timestamp(at(3, 4, 5, 999_999_999, 0)),
            "2026-02-08T03:04:05Z"
        );
    }

    #[test]
    fn test_converted_to_utc() {
        // 01:30 at UTC+8 is 17:30 on the previous day in UTC.
        assert_eq!(
            format_request_timestamp(at(1, 30, 0, 0, 8)),
            "2026-02-07T17:30:00Z"
        );
    }

    #[test]
    fn test_now_is_well_formed() {
        let ts = request_timestamp();
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
        assert!(!ts.contains('.'));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestMeta::now("client", "/checkout/v1/payment");
        let b = RequestMeta::now("client", "/checkout/v1/payment");
        assert_ne!(a.request_id, b.request_id);
        assert!(Uuid::parse_str(&a.request_id).is_ok());
    }
}
