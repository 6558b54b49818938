//! Line formats of the offline SMA and range-ratio reports.
//!
//! Each report is a plain text file with one line per (minute, ticker) that
//! carries the indicator, e.g. `930 AAPL 21 SMA: 190.55`.

use barwatch_types::IndicatorRow;
use std::io::Write;

use crate::{FormatError, format_real};

/// Returns the SMA report line for a row, or `None` when the row has no SMA.
#[must_use]
pub fn sma_line(row: &IndicatorRow) -> Option<String> {
    row.sma_21.map(|sma| {
        format!(
            "{} {} 21 SMA: {}",
            row.timestamp(),
            row.ticker(),
            format_real(sma)
        )
    })
}

/// Returns the range-ratio report line for a row, or `None` when the row has
/// no range ratio.
#[must_use]
pub fn range_ratio_line(row: &IndicatorRow) -> Option<String> {
    row.range_ratio.map(|ratio| {
        format!(
            "{} {} Range Ratio: {}",
            row.timestamp(),
            row.ticker(),
            format_real(ratio)
        )
    })
}

/// Writes the SMA line of every row that has one.
///
/// Returns the number of lines written.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_sma_report<W: Write>(rows: &[IndicatorRow], writer: W) -> Result<usize, FormatError> {
    write_lines(rows.iter().filter_map(sma_line), writer)
}

/// Writes the range-ratio line of every row that has one.
///
/// Returns the number of lines written.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_range_ratio_report<W: Write>(
    rows: &[IndicatorRow],
    writer: W,
) -> Result<usize, FormatError> {
    write_lines(rows.iter().filter_map(range_ratio_line), writer)
}

fn write_lines<W: Write>(
    lines: impl Iterator<Item = String>,
    mut writer: W,
) -> Result<usize, FormatError> {
    let mut written = 0;
    for line in lines {
        writeln!(writer, "{line}")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use barwatch_types::{Bar, MinuteOfDay, Symbol};

    fn row(ticker: &str, minute: u16, sma: Option<f64>, ratio: Option<f64>) -> IndicatorRow {
        let bar = Bar::new(
            Symbol::new(ticker),
            MinuteOfDay::new(minute).unwrap(),
            1.0,
            1.0,
            1.0,
            1.0,
            1.0,
        );
        IndicatorRow::new(bar, sma, ratio)
    }

    #[test]
    fn test_sma_line() {
        let line = sma_line(&row("AAPL", 930, Some(190.55), None)).unwrap();
        assert_eq!(line, "930 AAPL 21 SMA: 190.55");
        assert!(range_ratio_line(&row("AAPL", 930, Some(190.55), None)).is_none());
    }

    #[test]
    fn test_range_ratio_line() {
        let line = range_ratio_line(&row("MSFT", 1005, None, Some(0.625))).unwrap();
        assert_eq!(line, "1005 MSFT Range Ratio: 0.625");
    }

    #[test]
    fn test_reports_skip_absent() {
        let rows = vec![
            row("AAA", 400, Some(10.0), None),
            row("AAA", 401, Some(10.5), Some(1.2)),
        ];

        let mut sma = Vec::new();
        assert_eq!(write_sma_report(&rows, &mut sma).unwrap(), 2);
        assert_eq!(
            String::from_utf8(sma).unwrap(),
            "400 AAA 21 SMA: 10.0\n401 AAA 21 SMA: 10.5\n"
        );

        let mut ratio = Vec::new();
        assert_eq!(write_range_ratio_report(&rows, &mut ratio).unwrap(), 1);
        assert_eq!(String::from_utf8(ratio).unwrap(), "401 AAA Range Ratio: 1.2\n");
    }
}
