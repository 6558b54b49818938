//! Display utilities and output formatting for the barwatch CLI.

use anyhow::{Context, Result};
use barwatch_lib::prelude::*;
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Output format for exported rows.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        self.output().extension()
    }

    pub(crate) const fn output(&self) -> OutputFormat {
        match self {
            Self::Csv => OutputFormat::Csv,
            Self::Json => OutputFormat::Json,
            Self::Ndjson => OutputFormat::Ndjson,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the verbosity flags.
pub(crate) fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Creates a file and a buffered writer over it.
pub(crate) fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Creates a progress bar over `len` batches, or a hidden one.
pub(crate) fn batch_progress(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Creates a spinner for work of unknown length, or a hidden one.
pub(crate) fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

/// Prints rows as a pipe-separated table.
pub(crate) fn print_rows(title: &str, rows: &[IndicatorRow]) {
    println!("\n--- {title} ---");
    println!(
        "{:<8} | {:>4} | {:>10} | {:>10} | {:>10} | {:>10} | {:>12} | {:>10} | {:>11}",
        "ticker",
        "time",
        "open",
        "close",
        "high",
        "low",
        "volume",
        "sma_21",
        "range_ratio"
    );
    println!("{}", "-".repeat(110));
    for row in rows {
        let bar = &row.bar;
        println!(
            "{:<8} | {:>4} | {:>10} | {:>10} | {:>10} | {:>10} | {:>12} | {:>10} | {:>11}",
            bar.ticker.as_str(),
            bar.timestamp.to_string(),
            bar.open,
            bar.close,
            bar.high,
            bar.low,
            bar.volume,
            cell(row.sma_21),
            cell(row.range_ratio)
        );
    }
    println!();
}
