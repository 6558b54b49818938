//! Output format abstraction.

use barwatch_types::{BarwatchError, IndicatorRow};
use std::io::Write;
use thiserror::Error;

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// CSV format.
    #[default]
    Csv,
    /// JSON array format.
    Json,
    /// Newline-delimited JSON format.
    Ndjson,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Json, Self::Ndjson]
    }

    /// Writes rows with the formatter matching this format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_rows<W: Write + Send>(
        &self,
        rows: &[IndicatorRow],
        writer: W,
    ) -> Result<(), FormatError> {
        match self {
            Self::Csv => crate::CsvFormatter::new().write_rows(rows, writer),
            Self::Json => crate::JsonFormatter::new().write_rows(rows, writer),
            Self::Ndjson => crate::JsonFormatter::ndjson().write_rows(rows, writer),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FormatError> for BarwatchError {
    fn from(err: FormatError) -> Self {
        Self::Export(err.to_string())
    }
}

/// Trait for output formatters.
pub trait Formatter: Send + Sync {
    /// Writes indicator rows to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_rows<W: Write + Send>(
        &self,
        rows: &[IndicatorRow],
        writer: W,
    ) -> Result<(), FormatError>;

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}

/// Renders a real number the way the exported files expect.
///
/// Integral values keep a trailing `.0` (`10.0`, not `10`).
#[must_use]
pub fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
