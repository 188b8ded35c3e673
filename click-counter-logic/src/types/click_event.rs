use serde::{Deserialize, Serialize};

/// The message a session publishes to the bus on `click`, and the message the
/// processor decodes back out of the push envelope's `data` field.
///
/// `timestamp` is seconds-since-epoch, never fractional or RFC-3339 (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp: i64,
    pub country: String,
    pub ip: String,
}

/// Sentinel country codes the geolocation resolver may return instead of an
/// ISO-3166 code.
pub const COUNTRY_LOCAL: &str = "LOCAL";
pub const COUNTRY_UNKNOWN: &str = "Unknown";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let event = ClickEvent {
            timestamp: 1_700_000_000,
            country: "ES".to_string(),
            ip: "192.0.2.10".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let decoded: ClickEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn rejects_fractional_timestamp() {
        let err = serde_json::from_str::<ClickEvent>(
            r#"{"timestamp":1.5,"country":"ES","ip":"192.0.2.10"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid type") || err.is_data());
    }
}
