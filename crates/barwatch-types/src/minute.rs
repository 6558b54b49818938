//! Minute-of-day timestamps.

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Wall clock used to turn an epoch instant into a minute of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Clock {
    /// The host's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

impl Clock {
    /// Returns the clock as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Utc => "utc",
        }
    }
}

impl std::fmt::Display for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Clock {
    type Err = MinuteOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            _ => Err(MinuteOfDayError::UnknownClock(s.to_string())),
        }
    }
}

/// Error for invalid minute-of-day values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MinuteOfDayError {
    /// The value is not a valid `HHMM` time.
    #[error("Invalid minute of day: {0} (expected HHMM between 0000 and 2359)")]
    OutOfRange(u16),

    /// The clock name was not recognized.
    #[error("Unknown clock: {0}. Valid options: local, utc")]
    UnknownClock(String),
}

/// A minute of the trading day encoded as `HHMM` (e.g., 930 for 09:30).
///
/// This is not a wall-clock instant: it carries no date and no zone, and two
/// bars from different days with the same minute collide. Integer
/// order matches chronological order within a day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    /// First minute of the day (00:00).
    pub const MIDNIGHT: Self = Self(0);

    /// Last minute of the day (23:59).
    pub const LAST: Self = Self(2359);

    /// Creates a minute from its `HHMM` encoding.
    ///
    /// Returns `None` if the hour exceeds 23 or the minute exceeds 59.
    #[must_use]
    pub const fn new(hhmm: u16) -> Option<Self> {
        if hhmm / 100 > 23 || hhmm % 100 > 59 {
            None
        } else {
            Some(Self(hhmm))
        }
    }

    /// Creates a minute from an hour and a minute.
    #[must_use]
    pub const fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            None
        } else {
            Some(Self((hour * 100 + minute) as u16))
        }
    }

    /// Converts an epoch timestamp in milliseconds into a minute of the day.
    ///
    /// Returns `None` if the timestamp is out of chrono's representable range.
    #[must_use]
    pub fn from_epoch_millis(millis: i64, clock: Clock) -> Option<Self> {
        let instant = DateTime::<Utc>::from_timestamp_millis(millis)?;
        Some(match clock {
            Clock::Utc => Self::from_datetime(&instant),
            Clock::Local => Self::from_datetime(&instant.with_timezone(&Local)),
        })
    }

    /// Extracts the minute of the day from a zoned date-time.
    #[must_use]
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self((dt.hour() * 100 + dt.minute()) as u16)
    }

    /// Returns the `HHMM` encoding.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the hour component (0-23).
    #[must_use]
    pub const fn hour(&self) -> u16 {
        self.0 / 100
    }

    /// Returns the minute component (0-59).
    #[must_use]
    pub const fn minute(&self) -> u16 {
        self.0 % 100
    }

    /// Returns the following minute, or `None` after 23:59.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        if self.minute() < 59 {
            Some(Self(self.0 + 1))
        } else if self.hour() < 23 {
            Some(Self((self.hour() + 1) * 100))
        } else {
            None
        }
    }

    /// Iterates over every valid minute from `start` to `end`, inclusive.
    pub fn range(start: Self, end: Self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(start), Self::next).take_while(move |m| *m <= end)
    }
}

impl TryFrom<u16> for MinuteOfDay {
    type Error = MinuteOfDayError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(MinuteOfDayError::OutOfRange(value))
    }
}

impl From<MinuteOfDay> for u16 {
    fn from(value: MinuteOfDay) -> Self {
        value.0
    }
}

impl FromStr for MinuteOfDay {
    type Err = MinuteOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u16 = s
            .trim()
            .parse()
            .map_err(|_| MinuteOfDayError::OutOfRange(u16::MAX))?;
        Self::try_from(value)
    }
}
