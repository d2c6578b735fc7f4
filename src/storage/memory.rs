// inventorytool/src/storage/memory.rs
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::InventoryStore;
use crate::errors::{Result, SyncError};
use crate::inventory::InventoryRecord;

/// In-process table with the same constraints as the PostgreSQL schema.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<InventoryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<InventoryRecord>) -> Self {
        Self {
            rows: Mutex::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<InventoryRecord>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn check_constraints(existing: &[InventoryRecord], record: &InventoryRecord) -> Result<()> {
    if record.item_name.is_empty() {
        return Err(SyncError::storage(format!(
            "Failed to insert record {}: itemName must not be empty",
            record.describe()
        )));
    }
    for other in existing {
        if record.item_uuid.is_some() && other.item_uuid == record.item_uuid {
            return Err(SyncError::storage(format!(
                "Failed to insert record {}: duplicate itemUUID",
                record.describe()
            )));
        }
        if record.sku.is_some() && other.sku == record.sku {
            return Err(SyncError::storage(format!(
                "Failed to insert record {}: duplicate sku",
                record.describe()
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn reset_schema(&self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }

    async fn insert(&self, record: &InventoryRecord) -> Result<()> {
        let mut rows = self.lock();
        check_constraints(&rows, record)?;
        rows.push(record.clone());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<InventoryRecord>> {
        Ok(self.lock().clone())
    }

    async fn replace_all(&self, records: &[InventoryRecord]) -> Result<usize> {
        let mut staging: Vec<InventoryRecord> = Vec::with_capacity(records.len());
        for record in records {
            check_constraints(&staging, record)?;
            staging.push(record.clone());
        }
        *self.lock() = staging;
        Ok(records.len())
    }

    async fn disconnect(&self) {}
}
