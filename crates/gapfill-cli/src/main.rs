//! Gapfill CLI - infer the rule behind a partially-known sequence
//!
//! This CLI lets a user:
//! - Solve a sequence given inline, as values plus a mask, or from a file
//! - Restrict or reorder the tests the search runs
//! - Inspect the effective configuration

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod input;
mod output;

use commands::solve::SolveArgs;
use config::CliConfig;
use error::CliResult;
use output::print_error;

/// Exit status when the search finished without a solution.
///
/// Kept apart from 2, which clap uses for usage errors.
const EXIT_NO_SOLUTION: u8 = 3;

/// Gapfill CLI application
#[derive(Parser)]
#[command(name = "gapfill")]
#[command(about = "Gapfill - infer the rule behind a sequence and fill its gaps", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "GAPFILL_CONFIG")]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Search for a rule that fills the unknown positions
    Solve(SolveArgs),

    /// Show configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so machine-readable output stays clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Solve(args) => {
            let report = commands::solve::execute(args, &config, cli.output)?;
            if report.is_solved() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_NO_SOLUTION))
            }
        }
        Commands::Config => {
            commands::config::execute(&config, cli.output)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
