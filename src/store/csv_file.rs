use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CashbookError, Result};
use crate::models::{check_amount, non_empty, Direction, Transaction};

use super::{sort_newest_first, ConflictPolicy, PutOutcome, FIELDNAMES};

/// One line of the flat-file layout. Absent values are empty strings here and
/// nowhere else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvRow {
    pub id: String,
    pub date: String,
    pub amount: String,
    pub direction: String,
    pub category: String,
    pub account: String,
    pub description: String,
    pub tags: String,
}

impl From<&Transaction> for CsvRow {
    fn from(txn: &Transaction) -> Self {
        Self {
            id: txn.id.clone(),
            date: txn.date.clone(),
            amount: txn.amount.to_string(),
            direction: txn.direction.as_str().to_string(),
            category: txn.category.clone().unwrap_or_default(),
            account: txn.account.clone().unwrap_or_default(),
            description: txn.description.clone().unwrap_or_default(),
            tags: txn.tags.clone().unwrap_or_default(),
        }
    }
}

impl TryFrom<CsvRow> for Transaction {
    type Error = CashbookError;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = row.id.trim().to_string();
        if id.is_empty() {
            return Err(CashbookError::Other("row has no id".to_string()));
        }
        let amount: f64 = row
            .amount
            .trim()
            .parse()
            .map_err(|_| CashbookError::InvalidAmount(format!("'{}' is not a number", row.amount)))?;
        check_amount(amount)?;
        let direction: Direction = row.direction.parse()?;
        Ok(Self {
            id,
            date: row.date,
            amount,
            direction,
            category: non_empty(Some(row.category.as_str())),
            account: non_empty(Some(row.account.as_str())),
            description: non_empty(Some(row.description.as_str())),
            tags: non_empty(Some(row.tags.as_str())),
        })
    }
}

/// Append-only CSV table with a header row.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header if it is missing or empty.
    pub fn ensure_ready(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if needs_header {
            let mut wtr = csv::Writer::from_path(&self.path)?;
            wtr.write_record(FIELDNAMES)?;
            wtr.flush()?;
        }
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<Transaction>> {
        self.ensure_ready()?;
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let mut txns = Vec::new();
        for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), line, error = %e, "skipping unreadable row");
                    continue;
                }
            };
            match Transaction::try_from(row) {
                Ok(txn) => txns.push(txn),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), line, error = %e, "skipping invalid row");
                }
            }
        }
        sort_newest_first(&mut txns);
        Ok(txns)
    }

    pub fn put(&self, txn: &Transaction, policy: ConflictPolicy) -> Result<PutOutcome> {
        self.ensure_ready()?;
        let (headers, records) = self.raw_records()?;
        let readable = records
            .iter()
            .position(|r| has_id(r, &txn.id) && is_readable(r, &headers));
        let existing = match policy {
            ConflictPolicy::Ignore => readable,
            // A broken row with the same id is overwritten rather than duplicated.
            ConflictPolicy::Replace => {
                readable.or_else(|| records.iter().position(|r| has_id(r, &txn.id)))
            }
        };
        match (existing, policy) {
            (None, _) => {
                if policy == ConflictPolicy::Ignore && records.iter().any(|r| has_id(r, &txn.id)) {
                    tracing::warn!(
                        path = %self.path.display(),
                        id = %txn.id,
                        "stored row with this id is unreadable, appending the new record"
                    );
                }
                self.append(txn)?;
                Ok(PutOutcome::Inserted)
            }
            (Some(_), ConflictPolicy::Ignore) => Ok(PutOutcome::Ignored),
            (Some(idx), ConflictPolicy::Replace) => {
                self.rewrite(&records, idx, txn)?;
                Ok(PutOutcome::Replaced)
            }
        }
    }

    /// Every row as raw bytes, so rows that are not valid UTF-8 survive a rewrite.
    fn raw_records(&self) -> Result<(csv::ByteRecord, Vec<csv::ByteRecord>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers = rdr.byte_headers()?.clone();
        let records = rdr
            .byte_records()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((headers, records))
    }

    fn append(&self, txn: &Transaction) -> Result<()> {
        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        // Hand-edited files may lack a final newline.
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.serialize(CsvRow::from(txn))?;
        wtr.flush()?;
        Ok(())
    }

    /// Write every row to a sibling temp file with `records[idx]` swapped for
    /// `txn`, then rename it over the table.
    fn rewrite(&self, records: &[csv::ByteRecord], idx: usize, txn: &Transaction) -> Result<()> {
        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&tmp_path)?;
            wtr.write_record(FIELDNAMES)?;
            for (i, record) in records.iter().enumerate() {
                if i == idx {
                    wtr.serialize(CsvRow::from(txn))?;
                } else {
                    wtr.write_byte_record(record)?;
                }
            }
            wtr.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn has_id(record: &csv::ByteRecord, id: &str) -> bool {
    record
        .get(0)
        .and_then(|field| std::str::from_utf8(field).ok())
        .is_some_and(|field| field.trim() == id)
}

/// Whether `list_all` would return this row.
fn is_readable(record: &csv::ByteRecord, headers: &csv::ByteRecord) -> bool {
    record
        .deserialize::<CsvRow>(Some(headers))
        .ok()
        .and_then(|row| Transaction::try_from(row).ok())
        .is_some()
}
