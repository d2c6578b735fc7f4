// inventorytool/src/sync/import.rs
use csv::{ReaderBuilder, StringRecord};
use futures_util::future::join_all;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{ImportOptions, ImportStrategy};
use crate::errors::{Result, SyncError};
use crate::inventory::mapper::{self, Column};
use crate::inventory::{CsvRow, InventoryRecord};
use crate::storage::InventoryStore;

/// Reads the whole CSV file into memory, one `CsvRow` per data row.
pub fn read_csv_rows(source: &Path) -> Result<Vec<CsvRow>> {
    let bytes = fs::read(source).map_err(|e| SyncError::io(source, e))?;
    parse_rows(&bytes)
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Line on which a quoted field opens without ever being closed. The csv
/// reader silently swallows the rest of the input into that field.
fn find_unclosed_quote(input: &[u8]) -> Option<u64> {
    let mut state = QuoteState::FieldStart;
    let mut line = 1;
    let mut opened_on = 1;

    for &byte in input {
        state = match (state, byte) {
            (QuoteState::FieldStart, b'"') => {
                opened_on = line;
                QuoteState::Quoted
            }
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (_, b',' | b'\r' | b'\n') => QuoteState::FieldStart,
            _ => QuoteState::Unquoted,
        };
        if byte == b'\n' {
            line += 1;
        }
    }

    match state {
        QuoteState::Quoted => Some(opened_on),
        _ => None,
    }
}

/// Parses comma-delimited text whose first row is the header.
///
/// Rows with too few or too many fields are kept (missing cells fall back to
/// column defaults later) and logged. Anything the reader cannot decode at
/// all, such as invalid UTF-8 or an unterminated quoted field, fails the
/// whole parse.
pub fn parse_rows(input: &[u8]) -> Result<Vec<CsvRow>> {
    if let Some(line) = find_unclosed_quote(input) {
        return Err(SyncError::parse(format!(
            "Quoted field starting on line {} is never closed",
            line
        )));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| SyncError::parse(format!("Failed to read CSV header row: {}", e)))?
        .clone();
    if headers.is_empty() {
        return Err(SyncError::parse("CSV file has no header row"));
    }
    check_header(&headers);

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            SyncError::parse(format!(
                "Failed to parse CSV record {} on line {}: {}",
                index + 1,
                line,
                e
            ))
        })?;

        if record.len() != headers.len() {
            warn!(
                line = record.position().map(|p| p.line()),
                "Row {} has {} fields but the header has {}",
                index + 1,
                record.len(),
                headers.len()
            );
        }

        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn check_header(headers: &StringRecord) {
    for label in headers.iter() {
        if Column::from_label(label).is_none() {
            warn!("Ignoring unrecognised column '{}'", label);
        }
    }
    for column in Column::ALL {
        if !headers.iter().any(|label| label == column.label()) {
            warn!(
                "Column '{}' is missing from the header, every row gets the default",
                column.label()
            );
        }
    }
}

/// Replaces the table contents with the records in `source`.
///
/// The file is parsed completely before the table is touched, so a parse
/// error leaves the table as it was.
pub async fn import_inventory(
    store: &dyn InventoryStore,
    source: &Path,
    options: &ImportOptions,
) -> Result<usize> {
    info!("Importing CSV file {} into database", source.display());

    let rows = read_csv_rows(source)?;
    info!("Parsing complete, Number of records: {}", rows.len());

    let records: Vec<InventoryRecord> = rows.iter().map(mapper::to_record).collect();

    match options.strategy {
        ImportStrategy::Reset => {
            store.reset_schema().await?;
            debug!("Inventory table reset");
            write_concurrently(store, &records, options.max_concurrent_writes).await
        }
        ImportStrategy::Swap => {
            let written = store.replace_all(&records).await?;
            debug!("Staging table swapped in");
            Ok(written)
        }
    }
}

/// Inserts records in batches of `max_concurrent`, waiting for each batch to
/// settle. Every write is attempted even after a failure; the first failure
/// is reported once all of them have finished.
async fn write_concurrently(
    store: &dyn InventoryStore,
    records: &[InventoryRecord],
    max_concurrent: usize,
) -> Result<usize> {
    let mut failures = Vec::new();

    for chunk in records.chunks(max_concurrent.max(1)) {
        let results = join_all(chunk.iter().map(|record| store.insert(record))).await;
        failures.extend(results.into_iter().filter_map(|result| result.err()));
    }

    let mut failures = failures.into_iter();
    match failures.next() {
        None => Ok(records.len()),
        Some(first) => {
            let others = failures.count();
            if others == 0 {
                return Err(first);
            }
            let detail = match first {
                SyncError::Storage(msg) => msg,
                other => other.to_string(),
            };
            Err(SyncError::storage(format!(
                "{} ({} more of {} writes also failed)",
                detail,
                others,
                records.len()
            )))
        }
    }
}
