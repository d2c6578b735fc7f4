// inventorytool/src/storage/postgres.rs
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use std::time::Duration;
use tracing::{debug, info};

use super::InventoryStore;
use crate::config::{Credentials, DatabaseConfig};
use crate::errors::{Result, SyncError};
use crate::inventory::InventoryRecord;
use crate::utils::setting::{database_url, display_target};

pub const TABLE_NAME: &str = "Inventory";
const STAGING_TABLE_NAME: &str = "Inventory_staging";

/// Every stored column except the surrogate `id`, in insert order.
const DATA_COLUMNS: [&str; 19] = [
    "itemUUID",
    "itemName",
    "sku",
    "optionName",
    "optionValue",
    "discountable",
    "upc",
    "taxable",
    "department",
    "category",
    "supplier",
    "supplierCode",
    "priceType",
    "trackInventory",
    "registerStatus",
    "price",
    "originalQty",
    "updatedQty",
    "cost",
];

/// Table layout shared with the point-of-sale side. Text columns stay text
/// even where they hold numbers or booleans.
fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE "{table}" (
            "id" BIGSERIAL PRIMARY KEY,
            "itemUUID" VARCHAR(255) UNIQUE DEFAULT NULL,
            "itemName" VARCHAR(255) NOT NULL CHECK ("itemName" <> ''),
            "sku" VARCHAR(255) UNIQUE DEFAULT NULL,
            "optionName" VARCHAR(255) NOT NULL DEFAULT '',
            "optionValue" VARCHAR(255) NOT NULL DEFAULT '',
            "discountable" VARCHAR(255) NOT NULL DEFAULT 'true',
            "upc" VARCHAR(255) NOT NULL DEFAULT '',
            "taxable" VARCHAR(255) NOT NULL DEFAULT 'true',
            "department" VARCHAR(255) NOT NULL DEFAULT 'general',
            "category" VARCHAR(255) NOT NULL DEFAULT 'general',
            "supplier" VARCHAR(255) NOT NULL DEFAULT '',
            "supplierCode" VARCHAR(255) NOT NULL DEFAULT '',
            "priceType" VARCHAR(255) NOT NULL DEFAULT 'system',
            "trackInventory" VARCHAR(255) NOT NULL DEFAULT 'true',
            "registerStatus" VARCHAR(255) NOT NULL DEFAULT 'active',
            "price" VARCHAR(255) NOT NULL DEFAULT '0',
            "originalQty" VARCHAR(255) NOT NULL DEFAULT '',
            "updatedQty" INTEGER NOT NULL DEFAULT 0,
            "cost" VARCHAR(255) NOT NULL DEFAULT ''
        )"#
    )
}

fn drop_table_sql(table: &str) -> String {
    format!(r#"DROP TABLE IF EXISTS "{table}""#)
}

fn quoted_columns() -> String {
    DATA_COLUMNS
        .iter()
        .map(|column| format!("\"{}\"", column))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_sql(table: &str) -> String {
    let placeholders = (1..=DATA_COLUMNS.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"INSERT INTO "{table}" ({}) VALUES ({})"#,
        quoted_columns(),
        placeholders
    )
}

fn select_all_sql(table: &str) -> String {
    format!(r#"SELECT {} FROM "{table}" ORDER BY "id""#, quoted_columns())
}

fn insert_query<'q>(sql: &'q str, record: &'q InventoryRecord) -> Query<'q, Postgres, PgArguments> {
    sqlx::query(sql)
        .bind(record.item_uuid.as_deref())
        .bind(record.item_name.as_str())
        .bind(record.sku.as_deref())
        .bind(record.option_name.as_str())
        .bind(record.option_value.as_str())
        .bind(record.discountable.as_str())
        .bind(record.upc.as_str())
        .bind(record.taxable.as_str())
        .bind(record.department.as_str())
        .bind(record.category.as_str())
        .bind(record.supplier.as_str())
        .bind(record.supplier_code.as_str())
        .bind(record.price_type.as_str())
        .bind(record.track_inventory.as_str())
        .bind(record.register_status.as_str())
        .bind(record.price.as_str())
        .bind(record.original_qty.as_str())
        .bind(record.updated_qty)
        .bind(record.cost.as_str())
}

fn record_from_row(row: &PgRow) -> std::result::Result<InventoryRecord, sqlx::Error> {
    Ok(InventoryRecord {
        item_uuid: row.try_get("itemUUID")?,
        item_name: row.try_get("itemName")?,
        sku: row.try_get("sku")?,
        option_name: row.try_get("optionName")?,
        option_value: row.try_get("optionValue")?,
        discountable: row.try_get("discountable")?,
        upc: row.try_get("upc")?,
        taxable: row.try_get("taxable")?,
        department: row.try_get("department")?,
        category: row.try_get("category")?,
        supplier: row.try_get("supplier")?,
        supplier_code: row.try_get("supplierCode")?,
        price_type: row.try_get("priceType")?,
        track_inventory: row.try_get("trackInventory")?,
        register_status: row.try_get("registerStatus")?,
        price: row.try_get("price")?,
        original_qty: row.try_get("originalQty")?,
        updated_qty: row.try_get("updatedQty")?,
        cost: row.try_get("cost")?,
    })
}

fn write_error(record: &InventoryRecord, err: sqlx::Error) -> SyncError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => SyncError::storage(format!(
            "Duplicate itemUUID or sku for record {}: {}",
            record.describe(),
            db_err.message()
        )),
        _ => SyncError::storage(format!(
            "Failed to insert record {}: {}",
            record.describe(),
            err
        )),
    }
}

fn schema_error(context: &str, err: sqlx::Error) -> SyncError {
    SyncError::storage(format!("{}: {}", context, err))
}

pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    /// Opens a pool against the configured database. Fails with
    /// `SyncError::Connection` before anything touches the table.
    pub async fn connect(database: &DatabaseConfig, credentials: &Credentials) -> Result<Self> {
        let url = database_url(database, credentials)?;
        let target = display_target(database, credentials);

        let pool = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(Duration::from_secs(database.connect_timeout_secs))
            .connect(url.as_str())
            .await
            .map_err(|e| SyncError::connection(format!("Unable to connect to {}: {}", target, e)))?;

        info!("Connection to {} has been established successfully.", target);
        Ok(Self { pool })
    }

    async fn execute(&self, sql: &str, context: &str) -> Result<()> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| schema_error(context, e))?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn reset_schema(&self) -> Result<()> {
        self.execute(&drop_table_sql(TABLE_NAME), "Failed to drop inventory table")
            .await?;
        self.execute(&create_table_sql(TABLE_NAME), "Failed to create inventory table")
            .await?;
        debug!("Recreated table \"{}\"", TABLE_NAME);
        Ok(())
    }

    async fn insert(&self, record: &InventoryRecord) -> Result<()> {
        let sql = insert_sql(TABLE_NAME);
        insert_query(&sql, record)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(record, e))?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<InventoryRecord>> {
        let rows = sqlx::query(&select_all_sql(TABLE_NAME))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| schema_error("Failed to read inventory table", e))?;

        rows.iter()
            .map(|row| {
                record_from_row(row).map_err(|e| schema_error("Failed to decode inventory row", e))
            })
            .collect()
    }

    async fn replace_all(&self, records: &[InventoryRecord]) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| schema_error("Failed to start transaction", e))?;

        for (sql, context) in [
            (drop_table_sql(STAGING_TABLE_NAME), "Failed to drop staging table"),
            (create_table_sql(STAGING_TABLE_NAME), "Failed to create staging table"),
        ] {
            sqlx::query(&sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| schema_error(context, e))?;
        }

        let insert = insert_sql(STAGING_TABLE_NAME);
        for record in records {
            insert_query(&insert, record)
                .execute(&mut *tx)
                .await
                .map_err(|e| write_error(record, e))?;
        }
        debug!("Loaded {} records into staging table", records.len());

        let rename = format!(
            r#"ALTER TABLE "{}" RENAME TO "{}""#,
            STAGING_TABLE_NAME, TABLE_NAME
        );
        for (sql, context) in [
            (drop_table_sql(TABLE_NAME), "Failed to drop inventory table"),
            (rename, "Failed to swap staging table into place"),
        ] {
            sqlx::query(&sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| schema_error(context, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| schema_error("Failed to commit table swap", e))?;
        Ok(records.len())
    }

    async fn disconnect(&self) {
        self.pool.close().await;
    }
}
