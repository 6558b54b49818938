//! barwatch CLI - minute-bar snapshot poller with rolling indicators.

use clap::{CommandFactory, Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod display;

use commands::{export::ExportArgs, replay::ReplayArgs, run::RunArgs, show::ShowArgs};

#[derive(Parser)]
#[command(name = "barwatch")]
#[command(about = "Poll minute-bar snapshots into a rolling-indicator SQLite store", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the snapshot provider for a number of rounds, then export
    Run(RunArgs),

    /// Replay a historical minute-bar CSV through the indicators
    Replay(ReplayArgs),

    /// Export an existing store
    Export(ExportArgs),

    /// Print the most recent rows of a store
    Show(ShowArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    display::init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    let result = match command {
        Commands::Run(args) => commands::run::run(args, cli.verbose, cli.quiet).await,
        Commands::Replay(args) => commands::replay::replay(args, cli.quiet).await,
        Commands::Export(args) => commands::export::export(&args, cli.quiet),
        Commands::Show(args) => commands::show::show(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
