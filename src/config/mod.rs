// inventorytool/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_DATABASE_HOST: &str = "localhost";
const DEFAULT_DATABASE_PORT: u16 = 5432;
const DEFAULT_DATABASE_NAME: &str = "IronHat";
const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONCURRENT_WRITES: usize = 16;
const DEFAULT_LOG_LEVEL: &str = "info";

// Structs for deserializing config.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonImportOptions {
    pub strategy: Option<ImportStrategy>,
    pub max_concurrent_writes: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_name: Option<String>,
    pub max_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub import_options: Option<JsonImportOptions>,
    pub log_level: Option<String>,
}

/// How import writes the parsed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImportStrategy {
    /// Drop and recreate the table, then insert records concurrently. A
    /// failed write leaves the table partially populated.
    #[default]
    Reset,
    /// Load a staging table and swap it in inside one transaction.
    Swap,
}

// Application's internal configuration structs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub strategy: ImportStrategy,
    pub max_concurrent_writes: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            strategy: ImportStrategy::default(),
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

// Keeps the password out of debug output and logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub import: ImportOptions,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database: DatabaseConfig {
                host: DEFAULT_DATABASE_HOST.to_string(),
                port: DEFAULT_DATABASE_PORT,
                name: DEFAULT_DATABASE_NAME.to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            import: ImportOptions::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `config.json`. A missing file yields the defaults; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        Self::from_json_str(&config_content).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw_json_config: RawJsonConfig =
            serde_json::from_str(content).context("Failed to parse JSON configuration")?;
        resolve(raw_json_config)
    }
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn resolve(raw: RawJsonConfig) -> Result<AppConfig> {
    let max_connections = raw.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
    if max_connections == 0 {
        return Err(anyhow::anyhow!("max_connections must be greater than zero"));
    }

    let import_raw = raw.import_options.unwrap_or_default();
    let max_concurrent_writes = import_raw
        .max_concurrent_writes
        .unwrap_or(DEFAULT_MAX_CONCURRENT_WRITES);
    if max_concurrent_writes == 0 {
        return Err(anyhow::anyhow!(
            "import_options.max_concurrent_writes must be greater than zero"
        ));
    }

    Ok(AppConfig {
        database: DatabaseConfig {
            host: non_empty(raw.database_host, DEFAULT_DATABASE_HOST),
            port: raw.database_port.unwrap_or(DEFAULT_DATABASE_PORT),
            name: non_empty(raw.database_name, DEFAULT_DATABASE_NAME),
            max_connections,
            connect_timeout_secs: raw
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        },
        import: ImportOptions {
            strategy: import_raw.strategy.unwrap_or_default(),
            max_concurrent_writes,
        },
        log_level: non_empty(raw.log_level, DEFAULT_LOG_LEVEL),
    })
}
