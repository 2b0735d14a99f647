use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CashbookError, Result};
use crate::models::{new_id, non_empty, now_timestamp, Direction, Transaction};
use crate::store::csv_file::CsvRow;
use crate::store::{ConflictPolicy, PutOutcome, Store, FIELDNAMES};

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write a header plus one row per record, in the fixed column order.
pub fn write_csv<W: Write>(txns: &[Transaction], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(FIELDNAMES)?;
    for txn in txns {
        wtr.serialize(CsvRow::from(txn))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Copy every record in `store` into a new CSV file at `out`. Returns the row count.
pub fn export_to_path(store: &Store, out: &Path) -> Result<usize> {
    let txns = store.list_all()?;
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(out)?;
    write_csv(&txns, std::io::BufWriter::new(file))?;
    tracing::info!(rows = txns.len(), path = %out.display(), "exported transactions");
    Ok(txns.len())
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Data rows read from the source.
    pub read: usize,
    /// Rows written to the destination.
    pub inserted: usize,
    /// Rows whose id was already in the destination.
    pub duplicates: usize,
    /// Rows dropped for bad data.
    pub skipped: usize,
}

/// Normalize one loosely-filled source row: synthesize id/date, coerce the
/// amount, infer a missing direction from its sign, keep the magnitude.
pub fn normalize_row(row: CsvRow) -> Result<Transaction> {
    let raw_amount = row.amount.trim();
    let signed: f64 = if raw_amount.is_empty() {
        0.0
    } else {
        raw_amount
            .parse()
            .map_err(|_| CashbookError::InvalidAmount(format!("'{raw_amount}' is not a number")))?
    };
    if !signed.is_finite() {
        return Err(CashbookError::InvalidAmount(format!("'{raw_amount}' is not a finite number")));
    }
    let direction = match non_empty(Some(row.direction.as_str())) {
        Some(d) => d.parse::<Direction>()?,
        None => Direction::from_sign(signed),
    };
    Ok(Transaction {
        id: non_empty(Some(row.id.as_str())).unwrap_or_else(new_id),
        date: non_empty(Some(row.date.as_str())).unwrap_or_else(now_timestamp),
        amount: signed.abs(),
        direction,
        category: non_empty(Some(row.category.as_str())),
        account: non_empty(Some(row.account.as_str())),
        description: non_empty(Some(row.description.as_str())),
        tags: non_empty(Some(row.tags.as_str())),
    })
}

/// Stream header-keyed CSV rows into `dest`, keeping any record whose id is
/// already there. Bad rows are logged and skipped; earlier rows stay committed
/// if a later one fails with a storage error.
pub fn import_csv<R: Read>(reader: R, dest: &Store) -> Result<ImportSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut summary = ImportSummary::default();

    for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let line = idx + 2;
        summary.read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping unreadable row");
                summary.skipped += 1;
                continue;
            }
        };
        let txn = match normalize_row(row) {
            Ok(txn) => txn,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping row");
                summary.skipped += 1;
                continue;
            }
        };
        match dest.put(&txn, ConflictPolicy::Ignore)? {
            PutOutcome::Ignored => {
                tracing::debug!(line, id = %txn.id, "id already present, keeping existing record");
                summary.duplicates += 1;
            }
            PutOutcome::Inserted | PutOutcome::Replaced => summary.inserted += 1,
        }
    }

    tracing::info!(
        read = summary.read,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        skipped = summary.skipped,
        "import finished"
    );
    Ok(summary)
}

pub fn import_path(path: &Path, dest: &Store) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)?;
    import_csv(std::io::BufReader::new(file), dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{full_txn, txn};

    fn sqlite_store(dir: &tempfile::TempDir) -> Store {
        Store::open_sqlite(&dir.path().join("dest.db")).unwrap()
    }

    fn row(amount: &str, direction: &str) -> CsvRow {
        CsvRow {
            amount: amount.to_string(),
            direction: direction.to_string(),
            ..CsvRow::default()
        }
    }

    #[test]
    fn test_write_csv_fixed_columns_and_empty_optionals() {
        let mut out = Vec::new();
        write_csv(&[txn("a", "2026-01-05", 100.0, Direction::Income)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "id,date,amount,direction,category,account,description,tags\n\
             a,2026-01-05,100,income,,,,\n"
        );
    }

    #[test]
    fn test_write_csv_empty_set_has_header() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,date,amount,direction,category,account,description,tags\n"
        );
    }

    #[test]
    fn test_normalize_synthesizes_id_and_date() {
        let t = normalize_row(row("12.5", "expense")).unwrap();
        assert_eq!(t.id.len(), 36);
        assert!(!t.date.is_empty());
        assert_eq!(t.amount, 12.5);
        assert_eq!(t.direction, Direction::Expense);
        assert!(t.category.is_none());
    }

    #[test]
    fn test_normalize_infers_direction_from_sign() {
        let t = normalize_row(row("-40", "")).unwrap();
        assert_eq!(t.direction, Direction::Expense);
        assert_eq!(t.amount, 40.0);
        let t = normalize_row(row("15", "")).unwrap();
        assert_eq!(t.direction, Direction::Income);
        let t = normalize_row(row("", "")).unwrap();
        assert_eq!(t.direction, Direction::Income);
        assert_eq!(t.amount, 0.0);
    }

    #[test]
    fn test_normalize_explicit_direction_wins_over_sign() {
        let t = normalize_row(row("-40", "Income")).unwrap();
        assert_eq!(t.direction, Direction::Income);
        assert_eq!(t.amount, 40.0);
    }

    #[test]
    fn test_normalize_rejects_bad_values() {
        assert!(normalize_row(row("abc", "income")).unwrap_err().is_validation());
        assert!(normalize_row(row("10", "transfer")).unwrap_err().is_validation());
        assert!(normalize_row(row("inf", "income")).is_err());
    }

    #[test]
    fn test_import_skips_bad_rows_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let dest = sqlite_store(&dir);
        let source = "\
id,date,amount,direction,category
a,2026-01-05,100,income,Salary
b,2026-01-06,oops,expense,Food
c,2026-01-07,-25,,Food
d,2026-01-08,5,sideways,Food
";
        let summary = import_csv(source.as_bytes(), &dest).unwrap();
        assert_eq!(
            summary,
            ImportSummary { read: 4, inserted: 2, duplicates: 0, skipped: 2 }
        );
        let all = dest.list_all().unwrap();
        let c = all.iter().find(|t| t.id == "c").unwrap();
        assert_eq!(c.amount, 25.0);
        assert_eq!(c.direction, Direction::Expense);
        assert_eq!(c.category.as_deref(), Some("Food"));
        assert!(c.account.is_none());
    }

    #[test]
    fn test_import_does_not_alter_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let dest = sqlite_store(&dir);
        let existing = full_txn("shared");
        dest.put(&existing, ConflictPolicy::Replace).unwrap();

        let source = "\
id,date,amount,direction,category,account,description,tags
shared,2030-12-31,1,income,Other,Bank,changed,x
fresh,2026-02-01,3,expense,,,,
";
        let summary = import_csv(source.as_bytes(), &dest).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.duplicates, 1);
        let all = dest.list_all().unwrap();
        assert_eq!(all.iter().find(|t| t.id == "shared").unwrap(), &existing);
        assert!(all.iter().any(|t| t.id == "fresh"));
    }

    #[test]
    fn test_import_tolerates_missing_columns_and_padded_headers() {
        let dir = tempfile::tempdir().unwrap();
        let dest = sqlite_store(&dir);
        let source = " amount , description\n-9.99,Coffee\n";
        let summary = import_csv(source.as_bytes(), &dest).unwrap();
        assert_eq!(summary.inserted, 1);
        let all = dest.list_all().unwrap();
        assert_eq!(all[0].amount, 9.99);
        assert_eq!(all[0].direction, Direction::Expense);
        assert_eq!(all[0].description.as_deref(), Some("Coffee"));
    }

    #[test]
    fn test_export_then_import_reproduces_records() {
        let dir = tempfile::tempdir().unwrap();
        let source = Store::open_csv(&dir.path().join("source.csv")).unwrap();
        let mut originals = vec![
            full_txn("one"),
            txn("two", "2026-01-10", 40.0, Direction::Expense),
            txn("three", "2026-02-01", 0.1, Direction::Income),
        ];
        for t in &originals {
            source.put(t, ConflictPolicy::Replace).unwrap();
        }
        let out = dir.path().join("exports").join("backup.csv");
        assert_eq!(export_to_path(&source, &out).unwrap(), 3);

        let dest = sqlite_store(&dir);
        let summary = import_path(&out, &dest).unwrap();
        assert_eq!(summary.inserted, 3);

        let mut restored = dest.list_all().unwrap();
        restored.sort_by(|a, b| a.id.cmp(&b.id));
        originals.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(restored, originals);
    }

    #[test]
    fn test_import_into_csv_store() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Store::open_csv(&dir.path().join("dest.csv")).unwrap();
        let source = "id,amount,direction\nz,5,expense\nz,6,income\n";
        let summary = import_csv(source.as_bytes(), &dest).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(dest.list_all().unwrap()[0].amount, 5.0);
    }
}
