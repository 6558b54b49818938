//! Run command implementation.
//!
//! Polls the snapshot provider for a fixed number of rounds, storing every
//! new minute bar with its indicators, then exports the whole table.

use anyhow::{Context, Result};
use barwatch_lib::prelude::*;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::display::{self, Format};

#[derive(Args)]
pub(crate) struct RunArgs {
    /// Newline-delimited ticker list
    #[arg(short, long, default_value = "StockList.txt")]
    symbols: PathBuf,

    /// SQLite database path (its stock_prices table is recreated)
    #[arg(short, long, default_value = "stocks.db")]
    database: PathBuf,

    /// Export path. Defaults to stock_prices.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,

    /// Number of polling rounds
    #[arg(long, default_value = "5")]
    rounds: u32,

    /// Seconds between rounds
    #[arg(long, default_value = "60")]
    interval: u64,

    /// Maximum concurrent batches (also caps the batch count)
    #[arg(long, default_value = "60")]
    max_workers: usize,

    /// Clock used for snapshot minutes
    #[arg(long, default_value = "local")]
    clock: Clock,

    /// Provider API key
    #[arg(long, env = "BARWATCH_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Provider base URL
    #[arg(long, env = "BARWATCH_BASE_URL")]
    base_url: Option<String>,
}

pub(crate) async fn run(args: RunArgs, verbose: u8, quiet: bool) -> Result<()> {
    let symbols = SymbolList::from_file(&args.symbols).map_err(BarwatchError::from)?;
    if !quiet {
        println!("Loaded {} stock symbols.", symbols.len());
    }

    let mut client_config = ClientConfig::default()
        .with_api_key(args.api_key)
        .with_pool_size(args.max_workers);
    if let Some(base_url) = args.base_url {
        client_config = client_config.with_base_url(base_url);
    }
    let client = SnapshotClient::new(client_config).context("Failed to create HTTP client")?;

    let store = RollingWindowStore::open(&args.database).map_err(BarwatchError::from)?;

    let config = PipelineConfig::default()
        .with_max_workers(args.max_workers)
        .with_rounds(args.rounds)
        .with_round_interval(Duration::from_secs(args.interval))
        .with_clock(args.clock);
    let mut pipeline = Pipeline::new(config, Arc::new(client), store, symbols);
    pipeline.prepare()?;
    if !quiet {
        println!("Database setup complete.");
    }

    let batches = pipeline.batch_count()? as u64;
    let progress = display::batch_progress(batches * u64::from(args.rounds), quiet);

    let shutdown = async {
        // Without a signal handler the run can only end by itself.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let mut failed = 0usize;
    let summary = pipeline
        .run_with(shutdown, |outcome| {
            if !outcome.is_success() {
                failed += 1;
            }
            progress.inc(1);
            progress.set_message(format!("{failed} failed"));
        })
        .await?;

    let finish_msg = if summary.interrupted {
        format!(
            "Interrupted after {} of {} rounds, stored {} rows",
            summary.rounds_completed,
            args.rounds,
            summary.total_stored()
        )
    } else {
        format!(
            "Completed {} rounds, stored {} rows",
            summary.rounds_completed,
            summary.total_stored()
        )
    };
    progress.finish_with_message(finish_msg);

    if verbose > 0 && !quiet {
        for report in &summary.reports {
            display::print_rows(
                &format!("Current Database Contents (round {})", report.round),
                &report.recent,
            );
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("stock_prices.{}", args.format.extension())));

    // Export failures are reported but do not fail the run.
    let exported = display::create_output(&output)
        .and_then(|writer| Ok(pipeline.export(args.format.output(), writer)?));
    match exported {
        Ok(rows) => {
            if !quiet {
                println!("Database exported to {} ({rows} rows).", output.display());
            }
        }
        Err(e) => {
            tracing::error!(path = %output.display(), error = %e, "Export failed");
            eprintln!("Error exporting database: {e:#}");
        }
    }

    Ok(())
}
