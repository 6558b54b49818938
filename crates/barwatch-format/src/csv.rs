//! CSV output format.

use barwatch_types::IndicatorRow;
use std::borrow::Cow;
use std::io::Write;

use crate::{FormatError, Formatter, format_real};

/// Placeholder written for an absent indicator.
const NULL: &str = "None";

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }
}

/// Quotes a field that contains the delimiter, a quote or a line break.
fn quoted(field: &str, delimiter: char) -> Cow<'_, str> {
    if field.contains([delimiter, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| NULL.to_string(), format_real)
}

impl Formatter for CsvFormatter {
    fn write_rows<W: Write + Send>(
        &self,
        rows: &[IndicatorRow],
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(
                writer,
                "ticker{d}timestamp{d}open_price{d}close_price{d}high_price{d}low_price{d}volume_traded{d}sma_21{d}range_ratio"
            )?;
        }

        for row in rows {
            let bar = &row.bar;
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                quoted(bar.ticker.as_str(), d),
                bar.timestamp,
                format_real(bar.open),
                format_real(bar.close),
                format_real(bar.high),
                format_real(bar.low),
                format_real(bar.volume),
                optional(row.sma_21),
                optional(row.range_ratio),
            )?;
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}
