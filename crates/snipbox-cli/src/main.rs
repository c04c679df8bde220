//! Snipbox CLI application
//!
//! Runs code snippets through the snipbox pipeline from the command line.
//!
//! ```bash
//! snipbox run hello.c
//! snipbox code python "print(2 ** 10)"
//! snipbox --json check main.go
//! snipbox cleanup --older-than 1h
//! ```
//!
//! Set `RUST_LOG=debug` for verbose logging; otherwise the level comes from
//! the `[logging]` section of the config file or `SNIPBOX_LOG_LEVEL`.

// Allow common clippy lints that are stylistic preferences
#![allow(clippy::collapsible_if)]
#![allow(clippy::redundant_closure)]

mod args;
mod commands;
mod console;
mod router;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use snipbox_core::{LoggingConfig, config};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(work_dir) = &cli.work_dir {
        config.work_dir = work_dir.clone();
    }

    init_logging(&config.logging);

    router::route(cli, config).await
}

/// `RUST_LOG` wins over the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.init(),
    }
}
