//! Snapshot payloads and minute-bar validation.

use barwatch_indicators::round_to;
use barwatch_types::{Bar, Clock, MinuteOfDay, Symbol};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level body of the snapshot endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotResponse {
    /// Provider status string (e.g., "OK").
    #[serde(default)]
    pub status: Option<String>,
    /// One entry per requested ticker the provider knows about.
    #[serde(default)]
    pub tickers: Vec<RawSnapshot>,
}

/// One ticker's snapshot exactly as the provider sent it.
///
/// The minute bar is kept as untyped JSON: its shape is checked by
/// [`validate_snapshot`], not by deserialization, so one malformed entry
/// never fails the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Ticker symbol.
    #[serde(default)]
    pub ticker: Option<String>,
    /// Most recent minute aggregate.
    #[serde(default)]
    pub min: Option<Value>,
}

impl RawSnapshot {
    /// Creates a snapshot from a ticker and a minute payload.
    #[must_use]
    pub fn new(ticker: impl Into<String>, min: Option<Value>) -> Self {
        Self {
            ticker: Some(ticker.into()),
            min,
        }
    }
}

/// Extracts a well-formed minute bar from a snapshot.
///
/// Returns `None` when the ticker is missing, when `o`, `c`, `h`, `l` or `v`
/// is not a finite JSON number, or when the epoch-millisecond `t` is missing
/// or unrepresentable. Prices and volume are rounded to 3 decimal places.
#[must_use]
pub fn validate_snapshot(snapshot: &RawSnapshot, clock: Clock) -> Option<Bar> {
    let ticker = snapshot.ticker.as_deref().filter(|t| !t.is_empty())?;
    let min = snapshot.min.as_ref()?.as_object()?;

    let number = |key: &str| {
        min.get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .map(|v| round_to(v, 3))
    };

    let open = number("o")?;
    let close = number("c")?;
    let high = number("h")?;
    let low = number("l")?;
    let volume = number("v")?;

    let millis = min
        .get("t")
        .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f as i64)))?;
    let timestamp = MinuteOfDay::from_epoch_millis(millis, clock)?;

    Some(Bar::new(
        Symbol::from(ticker),
        timestamp,
        open,
        close,
        high,
        low,
        volume,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // 2024-01-15T14:37:00Z
    const T: i64 = 1_705_329_420_000;

    fn minute(o: Value, c: Value) -> Value {
        json!({"o": o, "c": c, "h": 191.0, "l": 189.5, "v": 1200, "t": T, "n": 12})
    }

    #[test]
    fn test_valid_snapshot() {
        let snap = RawSnapshot::new("AAPL", Some(minute(json!(190.1234), json!(190.5))));
        let bar = validate_snapshot(&snap, Clock::Utc).unwrap();
        assert_eq!(bar.ticker.as_str(), "AAPL");
        assert_eq!(bar.timestamp.as_u16(), 1437);
        assert!((bar.open - 190.123).abs() < 1e-9);
        assert!((bar.volume - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_prices_round_half_away_from_zero() {
        let snap = RawSnapshot::new("AAPL", Some(minute(json!(2.0625), json!(-2.0625))));
        let bar = validate_snapshot(&snap, Clock::Utc).unwrap();
        assert!((bar.open - 2.063).abs() < 1e-9);
        assert!((bar.close + 2.063).abs() < 1e-9);
        assert!((bar.open - round_to(2.0625, 3)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_minute_is_skipped() {
        assert!(validate_snapshot(&RawSnapshot::new("AAPL", None), Clock::Utc).is_none());
        let not_object = RawSnapshot::new("AAPL", Some(json!([1, 2, 3])));
        assert!(validate_snapshot(&not_object, Clock::Utc).is_none());
    }

    #[test]
    fn test_non_numeric_prices_are_skipped() {
        let snap = RawSnapshot::new("AAPL", Some(minute(json!("190.1"), json!(190.5))));
        assert!(validate_snapshot(&snap, Clock::Utc).is_none());

        let snap = RawSnapshot::new("AAPL", Some(minute(json!(190.1), Value::Null)));
        assert!(validate_snapshot(&snap, Clock::Utc).is_none());
    }

    #[test]
    fn test_missing_timestamp_is_skipped() {
        let snap = RawSnapshot::new("AAPL", Some(json!({"o": 1.0, "c": 1.0, "h": 1.0, "l": 1.0, "v": 1.0})));
        assert!(validate_snapshot(&snap, Clock::Utc).is_none());
    }

    #[test]
    fn test_missing_ticker_is_skipped() {
        let snap = RawSnapshot {
            ticker: None,
            min: Some(minute(json!(1.0), json!(1.0))),
        };
        assert!(validate_snapshot(&snap, Clock::Utc).is_none());
    }

    #[test]
    fn test_response_tolerates_unknown_fields() {
        let body = json!({
            "status": "OK",
            "count": 2,
            "tickers": [
                {"ticker": "AAPL", "todaysChange": 1.2, "min": minute(json!(1.0), json!(2.0))},
                {"ticker": "MSFT", "day": {"o": 1.0}}
            ]
        });
        let response: SnapshotResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.tickers.len(), 2);
        let bars: Vec<Bar> = response
            .tickers
            .iter()
            .filter_map(|s| validate_snapshot(s, Clock::Utc))
            .collect();
        assert_eq!(bars.len(), 1);
    }
}
