pub mod csv_file;
pub mod sqlite;

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Transaction;

pub use self::csv_file::CsvStore;
pub use self::sqlite::SqliteStore;

/// Column order of the flat-file layout, shared by the CSV store and exports.
pub const FIELDNAMES: [&str; 8] = [
    "id",
    "date",
    "amount",
    "direction",
    "category",
    "account",
    "description",
    "tags",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Csv,
    Sqlite,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Where records live. Built once from settings and passed to every command.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
}

impl StoreConfig {
    /// Path of the active backend's file.
    pub fn active_path(&self) -> &Path {
        match self.backend {
            Backend::Csv => &self.csv_path,
            Backend::Sqlite => &self.db_path,
        }
    }
}

/// What to do when a record with the same id is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Overwrite the stored record (upsert).
    Replace,
    /// Keep the stored record untouched.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Replaced,
    Ignored,
}

// ---------------------------------------------------------------------------
// Store: enum dispatch over the two backends
// ---------------------------------------------------------------------------

/// Record storage. Two backends share one contract: a flat CSV table that is
/// appended to, and a SQLite table keyed by record id.
pub enum Store {
    Csv(CsvStore),
    Sqlite(SqliteStore),
}

impl Store {
    /// Open the backend named by `config` and make sure its storage exists.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        match config.backend {
            Backend::Csv => Self::open_csv(&config.csv_path),
            Backend::Sqlite => Self::open_sqlite(&config.db_path),
        }
    }

    pub fn open_csv(path: &Path) -> Result<Self> {
        let store = Self::Csv(CsvStore::new(path));
        store.ensure_ready()?;
        Ok(store)
    }

    pub fn open_sqlite(path: &Path) -> Result<Self> {
        let store = Self::Sqlite(SqliteStore::open(path)?);
        store.ensure_ready()?;
        Ok(store)
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Csv(_) => Backend::Csv,
            Self::Sqlite(_) => Backend::Sqlite,
        }
    }

    pub fn location(&self) -> &Path {
        match self {
            Self::Csv(s) => s.path(),
            Self::Sqlite(s) => s.path(),
        }
    }

    /// Idempotently create the header row or table schema.
    pub fn ensure_ready(&self) -> Result<()> {
        match self {
            Self::Csv(s) => s.ensure_ready(),
            Self::Sqlite(s) => s.ensure_ready(),
        }
    }

    /// Validate and persist one record. Nothing is written when validation fails.
    pub fn put(&self, txn: &Transaction, policy: ConflictPolicy) -> Result<PutOutcome> {
        txn.validate()?;
        let outcome = match self {
            Self::Csv(s) => s.put(txn, policy)?,
            Self::Sqlite(s) => s.put(txn, policy)?,
        };
        tracing::debug!(id = %txn.id, backend = %self.backend(), ?outcome, "put transaction");
        Ok(outcome)
    }

    /// Every record, newest first by date string.
    pub fn list_all(&self) -> Result<Vec<Transaction>> {
        match self {
            Self::Csv(s) => s.list_all(),
            Self::Sqlite(s) => s.list_all(),
        }
    }

    /// Number of readable records.
    pub fn count(&self) -> Result<usize> {
        match self {
            Self::Csv(s) => Ok(s.list_all()?.len()),
            Self::Sqlite(s) => Ok(s.count()? as usize),
        }
    }
}

/// Newest first; string comparison on the date.
pub(crate) fn sort_newest_first(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| b.date.cmp(&a.date));
}
