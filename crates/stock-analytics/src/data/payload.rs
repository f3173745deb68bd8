//! Validation of raw time-series payloads at the fetch boundary
//!
//! Providers answer with loosely structured JSON. Everything past this module
//! works with [`FetchResult`], so the analytics never inspect ad hoc fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt;

/// Position of an observation on the time axis
///
/// Observations without any timestamp field fall back to their position in
/// the payload; such keys sort before every real timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObservationKey {
    /// Index in the payload's observation list
    Position(usize),
    /// Parsed timestamp (UTC, naive)
    Time(NaiveDateTime),
}

impl fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(i) => write!(f, "#{i}"),
            Self::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// One observation as delivered by the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSeriesPoint {
    pub key: ObservationKey,
    /// `None` when the close field is absent or not a finite number
    pub close: Option<f64>,
}

/// A validated series payload, in the order the source delivered it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    /// Symbol tag found in the payload metadata, if any
    pub symbol: Option<String>,
    pub points: Vec<RawSeriesPoint>,
}

/// Outcome of validating one fetched payload
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Observations ready for normalization
    Series(RawSeries),
    /// The payload is an explicit error indicator, or unusable
    Error(String),
}

impl FetchResult {
    /// Validate a raw JSON payload
    ///
    /// A payload with `"status": "error"` is an error indicator and is
    /// reported verbatim. A missing or empty `values` list is an empty series.
    pub fn from_payload(payload: &Value) -> Self {
        let Some(obj) = payload.as_object() else {
            return Self::Error(format!("unexpected payload: {payload}"));
        };

        if obj.get("status").and_then(Value::as_str) == Some("error") {
            return Self::Error(payload.to_string());
        }

        let symbol = obj
            .get("meta")
            .and_then(|m| m.get("symbol"))
            .or_else(|| obj.get("symbol"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let values = match obj.get("values") {
            None | Some(Value::Null) => return Self::Series(RawSeries { symbol, points: vec![] }),
            Some(Value::Array(values)) => values,
            Some(other) => return Self::Error(format!("'values' is not a list: {other}")),
        };

        match parse_points(values) {
            Ok(points) => Self::Series(RawSeries { symbol, points }),
            Err(message) => Self::Error(message),
        }
    }
}

/// Observations missing the payload's timestamp field are dropped; a present
/// but unparseable timestamp fails the whole payload.
fn parse_points(values: &[Value]) -> std::result::Result<Vec<RawSeriesPoint>, String> {
    // The timestamp column is chosen once for the whole payload.
    let field = ["datetime", "timestamp"]
        .into_iter()
        .find(|f| values.iter().any(|v| v.get(*f).is_some()));

    let mut points = Vec::with_capacity(values.len());
    for (i, obs) in values.iter().enumerate() {
        let key = match field {
            Some(field) => match obs.get(field) {
                None | Some(Value::Null) => continue,
                Some(raw) => ObservationKey::Time(parse_timestamp(raw).ok_or_else(|| {
                    format!("unparseable {field} at observation {i}: {raw}")
                })?),
            },
            None => ObservationKey::Position(i),
        };
        points.push(RawSeriesPoint {
            key,
            close: obs.get("close").and_then(parse_close),
        });
    }
    Ok(points)
}

/// Parse a close value; anything that is not a finite number is missing
pub fn parse_close(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a timestamp: date, date-time, RFC 3339, or Unix seconds
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(dt);
                }
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return d.and_hms_opt(0, 0, 0);
            }
            s.parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.naive_utc())
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> ObservationKey {
        ObservationKey::Time(
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_error_status_is_error_indicator() {
        let payload = json!({"status": "error", "code": 400, "message": "bad symbol"});
        match FetchResult::from_payload(&payload) {
            FetchResult::Error(msg) => assert!(msg.contains("bad symbol")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_payload_is_error() {
        assert!(matches!(FetchResult::from_payload(&json!([1, 2])), FetchResult::Error(_)));
    }

    #[test]
    fn test_missing_values_is_empty_series() {
        let payload = json!({"meta": {"symbol": "AAPL"}, "status": "ok"});
        let FetchResult::Series(raw) = FetchResult::from_payload(&payload) else {
            panic!("expected series");
        };
        assert_eq!(raw.symbol.as_deref(), Some("AAPL"));
        assert!(raw.points.is_empty());
    }

    #[test]
    fn test_datetime_field_and_string_closes() {
        let payload = json!({
            "values": [
                {"datetime": "2024-01-03", "close": "101.5"},
                {"datetime": "2024-01-02", "close": "abc"},
                {"datetime": "2024-01-01", "close": 99}
            ]
        });
        let FetchResult::Series(raw) = FetchResult::from_payload(&payload) else {
            panic!("expected series");
        };
        assert_eq!(raw.points.len(), 3);
        assert_eq!(raw.points[0].key, day("2024-01-03"));
        assert_eq!(raw.points[0].close, Some(101.5));
        assert_eq!(raw.points[1].close, None);
        assert_eq!(raw.points[2].close, Some(99.0));
    }

    #[test]
    fn test_timestamp_field_fallback() {
        let payload = json!({"values": [{"timestamp": 86_400, "close": "1"}]});
        let FetchResult::Series(raw) = FetchResult::from_payload(&payload) else {
            panic!("expected series");
        };
        assert_eq!(raw.points[0].key, day("1970-01-02"));
    }

    #[test]
    fn test_positional_fallback_preserves_order() {
        let payload = json!({"values": [{"close": "3"}, {"close": "1"}]});
        let FetchResult::Series(raw) = FetchResult::from_payload(&payload) else {
            panic!("expected series");
        };
        assert_eq!(raw.points[0].key, ObservationKey::Position(0));
        assert_eq!(raw.points[1].key, ObservationKey::Position(1));
        assert_eq!(raw.points[0].close, Some(3.0));
    }

    #[test]
    fn test_unparseable_timestamp_is_error() {
        let payload = json!({"values": [{"datetime": "yesterday", "close": "1"}]});
        assert!(matches!(FetchResult::from_payload(&payload), FetchResult::Error(_)));
    }

    #[test]
    fn test_observation_without_timestamp_is_dropped() {
        let payload = json!({
            "values": [
                {"datetime": "2024-01-02", "close": "11"},
                {"close": "10.5"},
                {"datetime": null, "close": "10.7"},
                {"datetime": "2024-01-01", "close": "10"}
            ]
        });
        let FetchResult::Series(raw) = FetchResult::from_payload(&payload) else {
            panic!("expected series");
        };
        assert_eq!(raw.points.len(), 2);
        assert_eq!(raw.points[0].key, day("2024-01-02"));
        assert_eq!(raw.points[1].key, day("2024-01-01"));
        assert_eq!(raw.points[1].close, Some(10.0));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let t = parse_timestamp(&json!("2024-03-01 15:30:00")).unwrap();
        assert_eq!(t.format("%H:%M").to_string(), "15:30");
        assert!(parse_timestamp(&json!("2024-03-01T15:30:00Z")).is_some());
        assert!(parse_timestamp(&json!("2024-03-01")).is_some());
        assert!(parse_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_parse_close_rejects_non_finite() {
        assert_eq!(parse_close(&json!("NaN")), None);
        assert_eq!(parse_close(&json!("inf")), None);
        assert_eq!(parse_close(&json!(null)), None);
        assert_eq!(parse_close(&json!(" 12.5 ")), Some(12.5));
    }

    #[test]
    fn test_position_sorts_before_time() {
        assert!(ObservationKey::Position(99) < day("1970-01-01"));
    }
}
