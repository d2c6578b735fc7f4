// inventorytool/src/sync/mod.rs
pub(crate) mod export;
pub(crate) mod import;

use std::path::PathBuf;
use tracing::info;

use crate::config::{AppConfig, Credentials};
use crate::errors::Result;
use crate::storage::InventoryStore;
use crate::storage::postgres::PgInventoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Import,
    Export,
}

/// One invocation: which direction and which CSV file.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub mode: Mode,
    pub path: PathBuf,
}

/// Public entry point for a transfer. Connects, runs exactly one import or
/// export and disconnects again, returning the number of records moved.
pub async fn run_transfer(
    app_config: &AppConfig,
    request: &TransferRequest,
    credentials: &Credentials,
) -> Result<usize> {
    let store = PgInventoryStore::connect(&app_config.database, credentials).await?;
    let result = transfer(&store, app_config, request).await;
    store.disconnect().await;
    result
}

pub async fn transfer(
    store: &dyn InventoryStore,
    app_config: &AppConfig,
    request: &TransferRequest,
) -> Result<usize> {
    match request.mode {
        Mode::Import => {
            info!("Import strategy: {:?}", app_config.import.strategy);
            import::import_inventory(store, &request.path, &app_config.import).await
        }
        Mode::Export => export::export_inventory(store, &request.path).await,
    }
}
