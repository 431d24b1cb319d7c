//! Digraph CLI binary.

use colored::Colorize;
use digraph::cli::Cli;
use digraph::config::Config;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Main entry point for the digraph CLI.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Config is read before logging is up, so its errors go straight to stderr.
    let cwd = std::env::current_dir().unwrap_or_default();
    let config = match Config::discover(cli.config.as_deref(), &cwd) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            return ExitCode::FAILURE;
        }
    };

    // Can be controlled via RUST_LOG environment variable
    // Example: RUST_LOG=digraph=trace digraph path roads.dg --from depot
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_filter(&config))),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    cli.color_mode(&config).apply();
    let settings = cli.settings(&config);

    tracing::debug!(?settings, "starting digraph CLI");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = cli.execute(&settings, &mut out).and_then(|()| {
        out.flush()?;
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}
