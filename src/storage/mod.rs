// inventorytool/src/storage/mod.rs
pub mod postgres;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::errors::Result;
use crate::inventory::InventoryRecord;

/// Backing table for inventory records.
///
/// Implementations enforce uniqueness of non-null `item_uuid` and `sku` and
/// reject empty item names at write time, reporting violations as
/// `SyncError::Storage`.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Drops and recreates the table, discarding every row.
    async fn reset_schema(&self) -> Result<()>;

    /// Appends one record. Safe to call concurrently.
    async fn insert(&self, record: &InventoryRecord) -> Result<()>;

    /// All records in surrogate-id order.
    async fn read_all(&self) -> Result<Vec<InventoryRecord>>;

    /// Replaces the whole table with `records` as one atomic step. Either
    /// every record lands or the previous contents are left untouched.
    async fn replace_all(&self, records: &[InventoryRecord]) -> Result<usize>;

    async fn disconnect(&self);
}
