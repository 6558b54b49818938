//! Export command implementation.

use anyhow::Result;
use barwatch_lib::prelude::*;
use clap::Args;
use std::path::PathBuf;

use crate::display::{self, Format};

#[derive(Args)]
pub(crate) struct ExportArgs {
    /// SQLite database path
    #[arg(short, long, default_value = "stocks.db")]
    database: PathBuf,

    /// Output file path. Defaults to stock_prices.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,
}

pub(crate) fn export(args: &ExportArgs, quiet: bool) -> Result<()> {
    let store = RollingWindowStore::open(&args.database).map_err(BarwatchError::from)?;
    let rows = store.export_all().map_err(BarwatchError::from)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("stock_prices.{}", args.format.extension())));
    let writer = display::create_output(&output)?;
    args.format
        .output()
        .write_rows(&rows, writer)
        .map_err(BarwatchError::from)?;

    if !quiet {
        println!("Exported {} rows to {}", rows.len(), output.display());
    }
    Ok(())
}
