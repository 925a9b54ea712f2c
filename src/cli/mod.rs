//! CLI module for Wayfarer
//!
//! Provides diagnostic commands:
//! - `strategies`: Print the effective retry strategy table
//! - `check-path`: Run a path through the sandbox
//! - `config`: Print the effective configuration

use crate::settings::AppConfig;
use clap::{Parser, Subcommand};

pub mod check_path;
pub mod strategies;

/// Wayfarer CLI
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "Resilient browser operations with sandboxed file access")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective retry strategies
    Strategies,
    /// Check a path against the sandbox policy
    CheckPath {
        /// Path to check
        path: String,
        /// Check for writing instead of reading
        #[arg(long)]
        write: bool,
        /// Payload size in bytes to check against the size limit
        #[arg(long)]
        size: Option<u64>,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Strategies) => strategies::run(&config),
        Some(Commands::CheckPath { path, write, size }) => {
            check_path::run(&config, &path, write, size)
        }
        Some(Commands::Config) => {
            let effective = config.effective()?;
            print!("{}", toml::to_string_pretty(&effective)?);
            Ok(())
        }
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
