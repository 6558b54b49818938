//! Indicator arithmetic.

use barwatch_types::{MinuteOfDay, WindowPoint};

/// Rounds `value` to `places` decimal places, halves away from zero.
#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Arithmetic mean, or `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of the given closes rounded to 2 decimal places.
///
/// Returns `None` if `closes` is empty.
#[must_use]
pub fn rolling_mean(closes: &[f64]) -> Option<f64> {
    mean(closes).map(|m| round_to(m, 2))
}

/// Unrounded range ratio of a bar against a high/low window.
///
/// Returns `None` for an empty window or when the window's highest high
/// equals its lowest low.
#[must_use]
pub fn raw_range_ratio(current_high: f64, current_low: f64, window: &[WindowPoint]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }

    let window_high = window.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
    let window_low = window.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);

    if window_high == window_low {
        return None;
    }

    Some((current_high - current_low) / (window_high - window_low))
}

/// Range ratio of the current bar against the window, rounded to 3 places.
///
/// When the window already holds a point at `current_timestamp`, that point's
/// high and low are used in place of `current_high`/`current_low`: the stored
/// row for a minute is authoritative.
#[must_use]
pub fn range_ratio(
    current_high: f64,
    current_low: f64,
    window: &[WindowPoint],
    current_timestamp: MinuteOfDay,
) -> Option<f64> {
    let (high, low) = window
        .iter()
        .find(|p| p.timestamp == current_timestamp)
        .map_or((current_high, current_low), |p| (p.high, p.low));

    raw_range_ratio(high, low, window).map(|r| round_to(r, 3))
}
