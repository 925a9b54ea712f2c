//! Wayfarer - Resilient Browser Operations
//!
//! CLI entry point: loads configuration, installs logging, runs a command.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod settings;

use settings::{LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    let config = settings::load_config()?;
    init_logging(&config.logging);

    debug!("Starting Wayfarer v{}", env!("CARGO_PKG_VERSION"));

    cli::run(cli, config).await
}

fn init_logging(logging: &LoggingConfig) {
    let level = &logging.level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("wayfarer={level},wayfarer_core={level},wayfarer_tools={level}").into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output stays clean
    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
