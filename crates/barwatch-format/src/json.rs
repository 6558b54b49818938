//! JSON output format.

use barwatch_types::IndicatorRow;
use std::io::Write;

use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// JSON array (standard JSON).
    #[default]
    Array,
    /// Newline-delimited JSON (NDJSON/JSONL).
    Ndjson,
}

/// JSON formatter.
///
/// Absent indicators are written as `null`.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    style: JsonStyle,
    /// Only honored by the array style.
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default settings (array style).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
            pretty: false,
        }
    }

    /// Creates a new NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Sets whether to pretty-print output (array style only).
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the output style.
    #[must_use]
    pub const fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }
}

impl Formatter for JsonFormatter {
    fn write_rows<W: Write + Send>(
        &self,
        rows: &[IndicatorRow],
        mut writer: W,
    ) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array if self.pretty => {
                serde_json::to_writer_pretty(&mut writer, rows)?;
                writeln!(writer)?;
            }
            JsonStyle::Array => {
                serde_json::to_writer(&mut writer, rows)?;
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for row in rows {
                    serde_json::to_writer(&mut writer, row)?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }

    fn extension(&self) -> &str {
        match self.style {
            JsonStyle::Array => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barwatch_types::{Bar, MinuteOfDay, Symbol};
    use std::io::Cursor;

    fn row(minute: u16) -> IndicatorRow {
        let bar = Bar::new(
            Symbol::new("BBB"),
            MinuteOfDay::new(minute).unwrap(),
            5.0,
            5.5,
            6.0,
            4.0,
            10.0,
        );
        IndicatorRow::new(bar, Some(5.5), None)
    }

    fn render(formatter: &JsonFormatter, rows: &[IndicatorRow]) -> String {
        let mut output = Cursor::new(Vec::new());
        formatter.write_rows(rows, &mut output).unwrap();
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn test_json_array() {
        let result = render(&JsonFormatter::new(), &[row(930)]);
        assert!(result.starts_with('['));
        assert!(result.contains("\"ticker\":\"BBB\""));
        assert!(result.contains("\"timestamp\":930"));
        assert!(result.contains("\"close_price\":5.5"));
        assert!(result.contains("\"range_ratio\":null"));
    }

    #[test]
    fn test_ndjson() {
        let formatter = JsonFormatter::ndjson();
        let result = render(&formatter, &[row(930), row(931)]);
        let lines: Vec<_> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with('{'));
        assert_eq!(formatter.extension(), "ndjson");
    }

    #[test]
    fn test_json_parses_back() {
        let result = render(&JsonFormatter::new().with_pretty(true), &[row(930)]);
        assert!(result.contains("  "));
        let parsed: Vec<IndicatorRow> = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed, vec![row(930)]);
    }
}
