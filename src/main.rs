//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `domain_sift` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C handling
//! - Printing the final domains
//!
//! All core functionality is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use domain_sift::initialization::init_logger_with;
use domain_sift::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            // Argument errors exit with 1 like every other failure
            let _ = e.print();
            process::exit(1);
        }
    };
    let (config, quiet) = cli.into_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping engines");
            on_signal.cancel();
        }
    });

    match run(config, cancel).await {
        Ok(report) => {
            if !quiet {
                for domain in &report.domains {
                    println!("{}", domain);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("domain_sift error: {:#}", e);
            process::exit(1);
        }
    }
}
