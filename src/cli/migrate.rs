use std::path::PathBuf;

use crate::error::{CashbookError, Result};
use crate::store::{Backend, Store, StoreConfig};
use crate::transfer::import_path;

pub fn run(config: &StoreConfig, from: Option<String>) -> Result<()> {
    if config.backend != Backend::Sqlite {
        return Err(CashbookError::Other(format!(
            "migrate imports into the SQLite store, but the current backend is {} (use --backend sqlite)",
            config.backend
        )));
    }

    let source = from.map(PathBuf::from).unwrap_or_else(|| config.csv_path.clone());
    if !source.exists() {
        println!("No {} file found to migrate.", source.display());
        return Ok(());
    }

    let dest = Store::open(config)?;
    let summary = import_path(&source, &dest)?;
    println!(
        "Imported {} transactions from {} into SQLite database {}",
        summary.inserted,
        source.display(),
        dest.location().display()
    );
    if summary.duplicates > 0 || summary.skipped > 0 {
        println!(
            "{} rows read: {} already present (kept existing), {} skipped (invalid rows)",
            summary.read, summary.duplicates, summary.skipped
        );
    }
    Ok(())
}
