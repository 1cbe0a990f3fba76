use chrono::{Local, SecondsFormat, Utc};
use serde::Serialize;

use crate::entity::Snapshot;
use crate::generator::Reading;

/// Course marker carried by every envelope.
pub const COURSE: &str = "IoTArk";

/// Current UTC time rendered ISO-8601 with second precision and an explicit
/// `+00:00` offset, e.g. `2026-08-04T12:34:56+00:00`.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Envelope for one position sample of a moving entity.
///
/// Field order matches the wire format consumed by the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct PositionPayload {
    /// Constant identity marker
    pub hamk: bool,
    /// Constant course marker
    pub course: &'static str,
    /// ISO-8601 UTC, second precision
    pub timestamp: String,
    /// Entity display name
    pub name: String,
    /// Whether the entity's simulation clock is running
    pub running: bool,
    /// Entity display icon
    pub icon: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl PositionPayload {
    /// Wrap a snapshot, stamping the current time.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            hamk: true,
            course: COURSE,
            timestamp: utc_timestamp(),
            name: snapshot.name,
            running: snapshot.running,
            icon: snapshot.icon,
            lat: snapshot.lat,
            lon: snapshot.lon,
        }
    }
}

/// Envelope for one scalar temperature/humidity/pressure reading.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingPayload {
    /// Constant identity marker
    pub hamk: bool,
    /// Constant course marker
    pub course: &'static str,
    /// Assignment marker
    pub assignment_num: u32,
    /// One-decimal string form
    pub temperature: String,
    /// Relative humidity, percent
    pub humidity: i64,
    /// Atmospheric pressure, hPa
    pub pressure: i64,
    /// ISO-8601 UTC, second precision
    pub timestamp: String,
}

impl ReadingPayload {
    /// Wrap a reading, stamping the current time.
    pub fn new(reading: Reading, assignment_num: u32) -> Self {
        Self {
            hamk: true,
            course: COURSE,
            assignment_num,
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
            timestamp: utc_timestamp(),
        }
    }
}

/// Minimal hello envelope carrying only the local date, used by the probe
/// mode to smoke-test the broker connection.
#[derive(Debug, Clone, Serialize)]
pub struct HelloPayload {
    /// Constant identity marker
    pub hamk: bool,
    /// Constant course marker
    pub course: &'static str,
    /// Assignment marker
    pub assignment_num: u32,
    /// Local date, `dd.mm.yyyy`
    pub current_date: String,
}

impl HelloPayload {
    /// Build the probe envelope with the current local date.
    pub fn new(assignment_num: u32) -> Self {
        Self {
            hamk: true,
            course: COURSE,
            assignment_num,
            current_date: Local::now().format("%d.%m.%Y").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_has_second_precision_and_utc_offset() {
        let stamp = utc_timestamp();
        assert!(stamp.ends_with("+00:00"));
        // 2026-08-04T12:34:56+00:00 is 25 characters, no fractional part
        assert_eq!(stamp.len(), 25);
    }

    #[test]
    fn position_payload_field_order() {
        let snapshot = Snapshot {
            name: "Santa Claus".to_string(),
            running: true,
            icon: ":santa:".to_string(),
            lat: 66.543,
            lon: 25.846,
        };
        let json = serde_json::to_string(&PositionPayload::new(snapshot)).unwrap();

        assert!(json.starts_with(r#"{"hamk":true,"course":"IoTArk","timestamp":"#));
        assert!(json.contains(r#""name":"Santa Claus""#));
        assert!(json.contains(r#""running":true"#));
        assert!(json.contains(r#""icon":":santa:""#));
        assert!(json.contains(r#""lat":66.543"#));
        assert!(json.contains(r#""lon":25.846"#));
    }

    #[test]
    fn reading_payload_renders_formatted_values() {
        let payload = ReadingPayload::new(crate::generator::Reading::from_value(1.0), 3);
        let json = serde_json::to_string(&payload).unwrap();

        assert!(json.contains(r#""assignment_num":3"#));
        assert!(json.contains(r#""temperature":"25.0""#));
        assert!(json.contains(r#""humidity":55"#));
        assert!(json.contains(r#""pressure":1039"#));
    }

    #[test]
    fn hello_payload_uses_dotted_date() {
        let payload = HelloPayload::new(3);
        let parts: Vec<&str> = payload.current_date.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 4);
    }
}
