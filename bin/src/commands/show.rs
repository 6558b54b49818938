//! Show command implementation.

use anyhow::Result;
use barwatch_lib::prelude::*;
use clap::Args;
use std::path::PathBuf;

use crate::display;

#[derive(Args)]
pub(crate) struct ShowArgs {
    /// SQLite database path
    #[arg(short, long, default_value = "stocks.db")]
    database: PathBuf,

    /// Number of rows to print
    #[arg(short = 'n', long, default_value = "10")]
    limit: usize,
}

pub(crate) fn show(args: &ShowArgs) -> Result<()> {
    let store = RollingWindowStore::open(&args.database).map_err(BarwatchError::from)?;
    let total = store.row_count().map_err(BarwatchError::from)?;
    let rows = store.recent_rows(args.limit).map_err(BarwatchError::from)?;

    display::print_rows("Current Database Contents", &rows);
    println!("{} of {total} rows shown.", rows.len());
    Ok(())
}
