//! Minute bars and indicator rows.

use serde::{Deserialize, Serialize};

use crate::{MinuteOfDay, Symbol};

/// One minute of observed market data for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Ticker the bar belongs to.
    pub ticker: Symbol,
    /// Minute of the day the bar covers.
    pub timestamp: MinuteOfDay,
    /// Opening price.
    #[serde(rename = "open_price")]
    pub open: f64,
    /// Closing price.
    #[serde(rename = "close_price")]
    pub close: f64,
    /// Highest price during the minute.
    #[serde(rename = "high_price")]
    pub high: f64,
    /// Lowest price during the minute.
    #[serde(rename = "low_price")]
    pub low: f64,
    /// Volume traded during the minute.
    #[serde(rename = "volume_traded")]
    pub volume: f64,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        ticker: Symbol,
        timestamp: MinuteOfDay,
        open: f64,
        close: f64,
        high: f64,
        low: f64,
        volume: f64,
    ) -> Self {
        Self {
            ticker,
            timestamp,
            open,
            close,
            high,
            low,
            volume,
        }
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns this bar as a point of a high/low window.
    #[must_use]
    pub const fn window_point(&self) -> WindowPoint {
        WindowPoint::new(self.high, self.low, self.timestamp)
    }
}

/// A bar plus its two derived rolling-window indicators.
///
/// Both derived fields are absent when there is not enough history or when
/// the range ratio's denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    /// The observed bar.
    #[serde(flatten)]
    pub bar: Bar,
    /// Mean of up to 21 most recent closes, current bar included.
    pub sma_21: Option<f64>,
    /// Current bar's range over the 21-bar window's range.
    pub range_ratio: Option<f64>,
}

impl IndicatorRow {
    /// Creates a new indicator row.
    #[must_use]
    pub const fn new(bar: Bar, sma_21: Option<f64>, range_ratio: Option<f64>) -> Self {
        Self {
            bar,
            sma_21,
            range_ratio,
        }
    }

    /// Returns the ticker of the underlying bar.
    #[must_use]
    pub const fn ticker(&self) -> &Symbol {
        &self.bar.ticker
    }

    /// Returns the minute of the underlying bar.
    #[must_use]
    pub const fn timestamp(&self) -> MinuteOfDay {
        self.bar.timestamp
    }
}

/// One element of a high/low rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPoint {
    /// High price of the bar.
    pub high: f64,
    /// Low price of the bar.
    pub low: f64,
    /// Minute of the bar.
    pub timestamp: MinuteOfDay,
}

impl WindowPoint {
    /// Creates a new window point.
    #[must_use]
    pub const fn new(high: f64, low: f64, timestamp: MinuteOfDay) -> Self {
        Self {
            high,
            low,
            timestamp,
        }
    }
}
