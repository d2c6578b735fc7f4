// inventorytool/src/sync/export.rs
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;
use std::path::Path;
use tempfile::Builder as TempFileBuilder;
use tracing::{debug, info};

use crate::errors::{Result, SyncError};
use crate::inventory::InventoryRecord;
use crate::inventory::mapper::{self, Column};
use crate::storage::InventoryStore;

/// Writes the header row followed by one row per record. Fields are quoted
/// only when they contain a delimiter, quote or line break.
pub fn write_rows<W: Write>(output: W, records: &[InventoryRecord]) -> csv::Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(output);

    writer.write_record(mapper::header_row())?;
    for record in records {
        let row = mapper::to_row(record);
        writer.write_record(Column::ALL.iter().map(|column| row[column.label()].as_str()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes next to `destination` first and renames over it, so readers never
/// see a half-written file.
fn write_csv_atomically(destination: &Path, records: &[InventoryRecord]) -> Result<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = TempFileBuilder::new()
        .prefix(".inventory_export_")
        .suffix(".csv")
        .tempfile_in(dir)
        .map_err(|e| SyncError::io(destination, e))?;

    write_rows(temp_file.as_file_mut(), records)
        .map_err(|e| SyncError::io(destination, std::io::Error::from(e)))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| SyncError::io(destination, e))?;

    temp_file
        .persist(destination)
        .map_err(|e| SyncError::io(destination, e.error))?;
    debug!("Renamed export into place at {}", destination.display());
    Ok(())
}

/// Writes every stored record to `destination`. Read-only with respect to
/// the table.
pub async fn export_inventory(store: &dyn InventoryStore, destination: &Path) -> Result<usize> {
    info!(
        "Exporting inventory items from database into CSV file {}",
        destination.display()
    );

    let records = store.read_all().await?;
    write_csv_atomically(destination, &records)?;

    info!("Wrote {} records to {}", records.len(), destination.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::fixtures::record;
    use crate::storage::memory::MemoryStore;
    use std::fs;

    #[test]
    fn test_write_rows_quotes_only_when_needed() -> anyhow::Result<()> {
        let mut item = record("Mug", Some("12"), Some("u-9"));
        item.supplier = "Acme, \"Inc.\"".to_string();
        item.updated_qty = 4;

        let mut out = Vec::new();
        write_rows(&mut out, &[item])?;
        let text = String::from_utf8(out)?;
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(mapper::header_row().join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("u-9,Mug,12,,,true,,true,general,general,\"Acme, \"\"Inc.\"\"\",,system,true,active,0,4,")
        );
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_export_writes_header_and_rows() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let destination = dir.path().join("out.csv");
        fs::write(&destination, "stale contents")?;

        let store = MemoryStore::with_records(vec![
            record("First", Some("1"), None),
            record("Second", Some("2"), None),
        ]);
        let count = export_inventory(&store, &destination).await?;
        assert_eq!(count, 2);

        let text = fs::read_to_string(&destination)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Item UUID,Name,SKU (Do Not Edit)"));
        assert!(lines[1].starts_with(",First,1,"));
        assert!(lines[2].starts_with(",Second,2,"));
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_export_empty_table_writes_header_only() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let destination = dir.path().join("out.csv");

        let count = export_inventory(&MemoryStore::new(), &destination).await?;
        assert_eq!(count, 0);
        assert_eq!(
            fs::read_to_string(&destination)?,
            format!("{}\n", mapper::header_row().join(","))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_export_to_missing_directory_is_io_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let destination = dir.path().join("missing").join("out.csv");

        let err = export_inventory(&MemoryStore::new(), &destination)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
        Ok(())
    }
}
