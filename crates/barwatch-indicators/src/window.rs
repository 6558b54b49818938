//! Window composition for a bar against its stored history.

use barwatch_types::{Bar, WindowPoint};
use serde::{Deserialize, Serialize};

use crate::engine::{mean, range_ratio, raw_range_ratio, rolling_mean, round_to};

/// Number of bars in a rolling window.
pub const WINDOW_LEN: usize = 21;

/// Display rounding applied to indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    /// Round to a fixed number of decimal places.
    Fixed(u32),
    /// 2 places for values of at least 1, otherwise 3 places.
    Magnitude,
}

impl Rounding {
    /// Applies the rounding rule to a value.
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Fixed(places) => round_to(value, places),
            Self::Magnitude if value >= 1.0 => round_to(value, 2),
            Self::Magnitude => round_to(value, 3),
        }
    }
}

/// Which stored bars make up a bar's window.
///
/// The two policies are not numerically equivalent and are never mixed
/// within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Live polling. Both windows hold the current bar plus up to 20 stored
    /// bars at or before it. The range ratio needs at least one bar besides
    /// the current one. SMA rounds to 2 places, range ratio to 3.
    #[default]
    Inclusive,
    /// Historical replay. The SMA window holds the current bar plus up to 20
    /// earlier bars; the range ratio needs a full 21 strictly earlier bars.
    /// Both values use [`Rounding::Magnitude`].
    StrictPrior,
}

/// The two derived values for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Indicators {
    /// Rolling mean of closes.
    pub sma_21: Option<f64>,
    /// Range ratio against the window.
    pub range_ratio: Option<f64>,
}

impl Indicators {
    /// Returns true if neither value could be computed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sma_21.is_none() && self.range_ratio.is_none()
    }
}

/// Computes both indicators for `bar` from its stored history.
///
/// `closes` and `window` come from the same ticker, are ordered most recent
/// first, and are parallel: `closes[i]` belongs to the bar at
/// `window[i].timestamp`. Entries later than the bar are ignored.
#[must_use]
pub fn compute_indicators(
    bar: &Bar,
    closes: &[f64],
    window: &[WindowPoint],
    policy: WindowPolicy,
) -> Indicators {
    let now = bar.timestamp;
    let history: Vec<(f64, WindowPoint)> = closes
        .iter()
        .copied()
        .zip(window.iter().copied())
        .filter(|(_, p)| p.timestamp <= now)
        .collect();

    match policy {
        WindowPolicy::Inclusive => {
            let mut close_window = Vec::with_capacity(WINDOW_LEN);
            let mut point_window = Vec::with_capacity(WINDOW_LEN);
            // A stored row at this exact minute stands in for the current bar.
            if history.first().is_none_or(|(_, p)| p.timestamp != now) {
                close_window.push(bar.close);
                point_window.push(bar.window_point());
            }
            for (close, point) in &history {
                if close_window.len() == WINDOW_LEN {
                    break;
                }
                close_window.push(*close);
                point_window.push(*point);
            }

            let range_ratio = if point_window.len() < 2 {
                None
            } else {
                range_ratio(bar.high, bar.low, &point_window, now)
            };

            Indicators {
                sma_21: rolling_mean(&close_window),
                range_ratio,
            }
        }
        WindowPolicy::StrictPrior => {
            let prior: Vec<(f64, WindowPoint)> = history
                .into_iter()
                .filter(|(_, p)| p.timestamp < now)
                .take(WINDOW_LEN)
                .collect();

            let close_window: Vec<f64> = std::iter::once(bar.close)
                .chain(prior.iter().map(|(c, _)| *c).take(WINDOW_LEN - 1))
                .collect();

            let range_ratio = if prior.len() < WINDOW_LEN {
                None
            } else {
                let points: Vec<WindowPoint> = prior.iter().map(|(_, p)| *p).collect();
                raw_range_ratio(bar.high, bar.low, &points)
            };

            Indicators {
                sma_21: mean(&close_window).map(|m| Rounding::Magnitude.apply(m)),
                range_ratio: range_ratio.map(|r| Rounding::Magnitude.apply(r)),
            }
        }
    }
}
