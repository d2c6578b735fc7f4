//! Inventory Import/Export Tool
//!
//! Moves a LightSpeed (S-Series) inventory CSV into the `"Inventory"` table
//! and back out again.

// inventorytool/src/main.rs
mod config;
mod errors;
mod inventory;
mod storage;
mod sync;
mod telemetry;
mod utils;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use config::{AppConfig, Credentials, ImportStrategy};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use sync::{Mode, TransferRequest};
use tracing::info;

/// Import (wipes existing data) or export inventory items between a CSV file
/// and PostgreSQL.
#[derive(Parser, Debug)]
#[command(name = "inventorytool", version)]
#[command(group(ArgGroup::new("mode").required(true).args(["import", "export"])))]
struct Cli {
    /// Import the CSV file into the database, replacing the table contents
    #[arg(short = 'i', long)]
    import: bool,

    /// Export the database table into the CSV file
    #[arg(short = 'e', long)]
    export: bool,

    /// CSV file to read from or write to
    #[arg(short = 'f', long = "file", value_name = "CSV File Name")]
    file: PathBuf,

    /// PostgreSQL user name
    #[arg(short = 'u', long = "user", value_name = "PostgreSQL User Name")]
    user: String,

    /// Path to config.json
    #[arg(short = 'c', long, default_value = "config.json")]
    config: PathBuf,

    /// Overrides import_options.strategy from the config file
    #[arg(long, value_enum)]
    strategy: Option<ImportStrategy>,
}

/// Main entry point for the import/export tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run_app(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let mut app_config = AppConfig::load_from_json(&cli.config)
        .context(format!("Failed to load application configuration from {}", cli.config.display()))?;
    telemetry::init_tracing(&app_config.log_level);
    if !cli.config.exists() {
        info!("No config file at {}, using default settings", cli.config.display());
    }

    if let Some(strategy) = cli.strategy {
        app_config.import.strategy = strategy;
    }

    let mode = if cli.import { Mode::Import } else { Mode::Export };
    let request = TransferRequest {
        mode,
        path: cli.file,
    };

    let password = resolve_password(&cli.user, env::var("PGPASSWORD").ok(), prompt_password)?;
    let credentials = Credentials {
        user: cli.user,
        password,
    };

    let count = sync::run_transfer(&app_config, &request, &credentials)
        .await
        .with_context(|| format!("Failed to transfer {}", request.path.display()))?;

    match mode {
        Mode::Import => println!("✅ Import complete: {} records", count),
        Mode::Export => println!("✅ Export complete: {} records", count),
    }
    Ok(())
}

/// `PGPASSWORD` wins when set, otherwise the user is asked. An empty
/// password is rejected either way.
fn resolve_password(
    user: &str,
    from_env: Option<String>,
    prompt: impl FnOnce(&str) -> Result<String>,
) -> Result<String> {
    let password = match from_env {
        Some(password) if !password.is_empty() => password,
        _ => prompt(user)?,
    };
    if password.is_empty() {
        anyhow::bail!("Must specify a PostgreSQL password");
    }
    Ok(password)
}

/// Prompts for the PostgreSQL password without echoing it
fn prompt_password(user: &str) -> Result<String> {
    rpassword::prompt_password(format!("Enter PostgreSQL password for user {}: ", user))
        .context("Failed to read password")
}
