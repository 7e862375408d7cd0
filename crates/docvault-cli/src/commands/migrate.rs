//! Database migration management commands.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use docvault_core::config::{AppConfig, StoreBackend};
use docvault_database::DatabasePool;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<()> {
    if config.database.backend != StoreBackend::Postgres {
        bail!("Migrations only apply to the postgres backend");
    }

    match &args.command {
        MigrateCommand::Run => {
            let mut database = config.database.clone();
            database.run_migrations = false;
            let pool = DatabasePool::connect(&database)
                .await
                .context("Failed to connect to the database")?;

            println!("Running database migrations...");
            docvault_database::migration::run_migrations(pool.pool())
                .await
                .context("Migration failed")?;
            pool.close().await;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
