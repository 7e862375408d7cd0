//! CLI command definitions and dispatch.

pub mod migrate;
pub mod node;
pub mod trash;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use docvault_core::config::AppConfig;
use docvault_service::Backend;

use crate::output::OutputFormat;

/// DocVault administration
#[derive(Debug, Parser)]
#[command(name = "docvault", version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory holding `default.toml` and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Configuration overlay to apply on top of `default.toml`
    #[arg(long, env = "DOCVAULT_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Trash maintenance
    Trash(trash::TrashArgs),
    /// Node inspection
    Node(node::NodeArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Trash(args) => trash::execute(args, &config, self.format).await,
            Commands::Node(args) => node::execute(args, &config, self.format).await,
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load_from(&self.config, &self.env)
            .with_context(|| format!("Failed to load configuration from '{}'", self.config))
    }
}

/// Connect to the configured backend.
pub async fn connect(config: &AppConfig) -> Result<Backend> {
    Backend::connect(config)
        .await
        .context("Failed to connect to the node store")
}

/// Ask for confirmation unless `force` is set. Returns false when declined.
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;
    if !confirmed {
        println!("Cancelled.");
    }
    Ok(confirmed)
}
