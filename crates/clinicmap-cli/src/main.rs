use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod correct;
mod export;
mod output;
mod validate;

#[derive(Debug, Parser)]
#[command(name = "clinicmap-cli")]
#[command(about = "Validate and correct clinic map coordinates")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check stored coordinates against the geocoding provider
    Validate {
        #[command(subcommand)]
        command: ValidateCommands,
    },
    /// Apply corrections from a saved validation report
    Correct {
        /// Path to a `validation-report-*.json` file
        #[arg(long)]
        report: PathBuf,
        /// Delete records that have no usable coordinates and no geocodable address
        #[arg(long)]
        delete_unlocatable: bool,
        /// Print the plan without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ValidateCommands {
    /// Validate every clinic (or a filtered subset) and export a report
    All {
        /// Records validated concurrently per batch (defaults to `CLINICMAP_BATCH_SIZE`)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Stop after this many records
        #[arg(long)]
        limit: Option<i64>,
        /// Only clinics in this state (full name or postal abbreviation)
        #[arg(long)]
        state: Option<String>,
        /// Report file path (defaults to `validation-report-<timestamp>.json`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a single clinic by id and print its result
    One { id: String },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("clinicmap-cli: run with --help for available commands");
        return Ok(());
    };

    let config = clinicmap_core::load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, geocoder = %config.geocoder_base_url, "configuration loaded");

    match command {
        Commands::Validate { command } => {
            let pool = connect(&config).await?;
            match command {
                ValidateCommands::All {
                    batch_size,
                    limit,
                    state,
                    output,
                } => {
                    let options = validate::ValidateAllOptions {
                        batch_size: batch_size.unwrap_or(config.batch_size),
                        limit,
                        state,
                        output,
                    };
                    validate::run_validate_all(&pool, &config, options).await?;
                }
                ValidateCommands::One { id } => {
                    validate::run_validate_one(&pool, &config, &id).await?;
                }
            }
        }
        Commands::Correct {
            report,
            delete_unlocatable,
            dry_run,
        } => {
            let policy = clinicmap_validator::CorrectionPolicy { delete_unlocatable };
            if dry_run {
                correct::run_correct_dry_run(&report, policy)?;
            } else {
                let pool = connect(&config).await?;
                correct::run_correct(&pool, &report, policy).await?;
            }
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    clinicmap_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = clinicmap_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
    }

    Ok(())
}

async fn connect(config: &clinicmap_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = clinicmap_db::PoolConfig::from_app_config(config);
    clinicmap_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to the record store")
}

#[cfg(test)]
mod tests;
