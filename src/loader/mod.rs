//! CSV import: every data row becomes a `create` (id `-1`) or a `write`
//! on the given id. Rows that cannot be sent or that the server rejects are
//! copied to an error file with the same header.

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::bounded;
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::rpc::{OdooClient, Record};
use crate::sinks::{CsvSink, RecordSink};
use crate::utils::ProgressCounter;

/// Id value that asks for a new record.
pub const NEW_RECORD_ID: i64 = -1;

/// A delimited file read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn read<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("CSV: Failed to open {:?}", path))?;

        let header = reader
            .headers()
            .with_context(|| format!("CSV: Failed to read header of {:?}", path))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record =
                record.with_context(|| format!("CSV: Failed to read data row {}", index + 1))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { header, rows })
    }

    /// Rows after skipping `offset`, at most `limit` of them (`0` = all).
    pub fn select(&self, offset: usize, limit: usize) -> &[Vec<String>] {
        let start = offset.min(self.rows.len());
        let end = if limit == 0 {
            self.rows.len()
        } else {
            start.saturating_add(limit).min(self.rows.len())
        };
        &self.rows[start..end]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowAction {
    Create(Record),
    Update(i64, Record),
}

/// Decide what to do with one row. The `id` column selects the action and
/// is not part of the sent values.
pub fn plan_row(header: &[String], row: &[String]) -> Result<RowAction> {
    if header.len() != row.len() {
        bail!(
            "incorrect key value count: {} columns, {} values",
            header.len(),
            row.len()
        );
    }

    let mut record: Record = header
        .iter()
        .zip(row)
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    let id = match record.remove("id") {
        Some(Value::String(id)) => id,
        _ => bail!("missing id column"),
    };
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|err| anyhow!("invalid id '{}': {}", id, err))?;

    if id == NEW_RECORD_ID {
        Ok(RowAction::Create(record))
    } else {
        Ok(RowAction::Update(id, record))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: u64,
    pub updated: u64,
    pub failed: u64,
}

/// `<dir>/<stem>_err.csv` next to the data file.
pub fn error_path(data_file: &Path) -> PathBuf {
    let stem = data_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    data_file.with_file_name(format!("{stem}_err.csv"))
}

fn send_row(client: &OdooClient, model: &str, header: &[String], row: &[String]) -> Result<bool> {
    match plan_row(header, row)? {
        RowAction::Create(record) => {
            let id = client.create(model, &record)?;
            if id == NEW_RECORD_ID {
                bail!("create returned no id");
            }
            Ok(true)
        }
        RowAction::Update(id, record) => {
            if !client.update(model, id, &record)? {
                bail!("write on id {} returned false", id);
            }
            Ok(false)
        }
    }
}

/// Send `rows` in parallel on the rayon pool. Failed rows go through a
/// bounded channel to a single thread that appends them to `errors`, which
/// is finished before returning.
pub fn import_rows(
    client: &OdooClient,
    model: &str,
    header: &[String],
    rows: &[Vec<String>],
    errors: CsvSink,
) -> Result<ImportSummary> {
    let (tx, rx) = bounded::<Vec<String>>(64);

    let writer = std::thread::spawn(move || -> Result<u64> {
        let mut errors = errors;
        let mut failed = 0u64;
        for row in rx {
            errors.add_row(&row)?;
            failed += 1;
        }
        errors.finish()?;
        Ok(failed)
    });

    let created = AtomicU64::new(0);
    let updated = AtomicU64::new(0);
    let progress = ProgressCounter::new("Import: rows", 100);

    let send_result = rows
        .par_iter()
        .enumerate()
        .try_for_each(|(index, row)| -> Result<()> {
            match send_row(client, model, header, row) {
                Ok(true) => {
                    created.fetch_add(1, Ordering::Relaxed);
                }
                Ok(false) => {
                    updated.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    tracing::warn!(row = index + 1, "Import: row rejected: {:#}", err);
                    tx.send(row.clone())
                        .map_err(|err| anyhow!("Import: Failed to queue rejected row: {}", err))?;
                }
            }
            progress.inc(1);
            Ok(())
        });

    drop(tx);

    // Writer errors are the root cause when the channel disconnected
    let failed = match writer.join() {
        Ok(Ok(failed)) => failed,
        Ok(Err(writer_err)) => {
            return Err(writer_err.context("Import: Error file writer failed"));
        }
        Err(panic_payload) => {
            let panic_msg = panic_payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            return Err(anyhow!(
                "Import: Error file writer thread panicked: {}",
                panic_msg
            ));
        }
    };

    send_result?;
    progress.finish();

    Ok(ImportSummary {
        created: created.into_inner(),
        updated: updated.into_inner(),
        failed,
    })
}
