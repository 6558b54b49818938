//! Replay command implementation.

use anyhow::Result;
use barwatch_lib::prelude::*;
use clap::Args;
use std::path::PathBuf;

use crate::display;

#[derive(Args)]
pub(crate) struct ReplayArgs {
    /// Historical CSV (Ticker,Time,Open,High,Low,Close,Volume)
    input: PathBuf,

    /// Newline-delimited ticker list
    #[arg(short, long, default_value = "StockList.txt")]
    symbols: PathBuf,

    /// First minute to process (HHMM)
    #[arg(long, default_value = "400")]
    start: MinuteOfDay,

    /// Last minute to process (HHMM)
    #[arg(long, default_value = "1959")]
    end: MinuteOfDay,

    /// Directory for the reports and the default database
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Database path. Defaults to <date>-Phase1.db in the output directory
    #[arg(short, long)]
    database: Option<PathBuf>,
}

pub(crate) async fn replay(args: ReplayArgs, quiet: bool) -> Result<()> {
    let symbols = SymbolList::from_file(&args.symbols).map_err(BarwatchError::from)?;

    let mut config = ReplayConfig::new(&args.input)
        .with_output_dir(&args.output_dir)
        .with_range(args.start, args.end);
    if let Some(database) = args.database {
        config = config.with_database(database);
    }

    let progress = display::spinner(&format!("Replaying {}", args.input.display()), quiet);
    let summary = barwatch_lib::replay::replay(&config, &symbols)
        .await
        .map_err(BarwatchError::from);
    progress.finish_and_clear();
    let summary = summary?;

    if !quiet {
        println!(
            "Read {} rows ({} malformed), processed {} bars, {} without data.",
            summary.rows_read, summary.malformed, summary.processed, summary.missing
        );
        println!(
            "SMA report: {} ({} lines)",
            summary.sma_path.display(),
            summary.sma_lines
        );
        println!(
            "Range ratio report: {} ({} lines)",
            summary.range_ratio_path.display(),
            summary.range_ratio_lines
        );
        println!(
            "Data saved to {} ({} rows).",
            summary.database_path.display(),
            summary.kept
        );
    }

    Ok(())
}
