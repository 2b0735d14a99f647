use std::path::{Path, PathBuf};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{Direction, Transaction};

use super::{ConflictPolicy, PutOutcome};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    amount REAL NOT NULL,
    direction TEXT CHECK(direction IN ('income','expense')) NOT NULL,
    category TEXT,
    account TEXT,
    description TEXT,
    tags TEXT
);
";

const INSERT_OR_REPLACE: &str = "INSERT OR REPLACE INTO transactions \
     (id, date, amount, direction, category, account, description, tags) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const INSERT_OR_IGNORE: &str = "INSERT OR IGNORE INTO transactions \
     (id, date, amount, direction, category, account, description, tags) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse::<Direction>()
            .map_err(|e| FromSqlError::Other(e.to_string().into()))
    }
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

/// Transactions table keyed by record id.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = get_connection(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_ready(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn put(&self, txn: &Transaction, policy: ConflictPolicy) -> Result<PutOutcome> {
        let existed = self.contains(&txn.id)?;
        let sql = match policy {
            ConflictPolicy::Replace => INSERT_OR_REPLACE,
            ConflictPolicy::Ignore => INSERT_OR_IGNORE,
        };
        let changed = self.conn.execute(
            sql,
            params![
                txn.id,
                txn.date,
                txn.amount,
                txn.direction,
                txn.category,
                txn.account,
                txn.description,
                txn.tags,
            ],
        )?;
        Ok(match (changed, existed) {
            (0, _) => PutOutcome::Ignored,
            (_, true) => PutOutcome::Replaced,
            (_, false) => PutOutcome::Inserted,
        })
    }

    pub fn list_all(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, amount, direction, category, account, description, tags \
             FROM transactions ORDER BY date DESC, rowid ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Transaction {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    amount: row.get(2)?,
                    direction: row.get(3)?,
                    category: row.get(4)?,
                    account: row.get(5)?,
                    description: row.get(6)?,
                    tags: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM transactions WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT count(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::txn;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        store.ensure_ready().unwrap();
        (dir, store)
    }

    fn schema_sql(store: &SqliteStore) -> Vec<String> {
        store
            .conn
            .prepare("SELECT sql FROM sqlite_master WHERE name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_ensure_ready_creates_table() {
        let (_dir, store) = test_store();
        let tables: Vec<String> = store
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tables, vec!["transactions".to_string()]);
    }

    #[test]
    fn test_ensure_ready_is_idempotent() {
        let (_dir, store) = test_store();
        let once = schema_sql(&store);
        for _ in 0..3 {
            store.ensure_ready().unwrap();
        }
        assert_eq!(schema_sql(&store), once);
    }

    #[test]
    fn test_direction_check_constraint() {
        let (_dir, store) = test_store();
        let result = store.conn.execute(
            "INSERT INTO transactions (id, date, amount, direction) VALUES ('x', '2026-01-01', 1.0, 'refund')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_put_outcomes() {
        let (_dir, store) = test_store();
        let t = txn("a", "2026-01-01", 1.0, Direction::Income);
        assert_eq!(store.put(&t, ConflictPolicy::Replace).unwrap(), PutOutcome::Inserted);
        assert_eq!(store.put(&t, ConflictPolicy::Replace).unwrap(), PutOutcome::Replaced);
        assert_eq!(store.put(&t, ConflictPolicy::Ignore).unwrap(), PutOutcome::Ignored);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_nulls_for_absent_fields() {
        let (_dir, store) = test_store();
        store.put(&txn("a", "2026-01-01", 1.0, Direction::Income), ConflictPolicy::Replace).unwrap();
        let category: Option<String> = store
            .conn
            .query_row("SELECT category FROM transactions WHERE id = 'a'", [], |r| r.get(0))
            .unwrap();
        assert!(category.is_none());
    }

    #[test]
    fn test_reopen_sees_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.ensure_ready().unwrap();
            store.put(&txn("a", "2026-01-01", 1.0, Direction::Income), ConflictPolicy::Replace).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        store.ensure_ready().unwrap();
        assert!(store.contains("a").unwrap());
        assert!(!store.contains("b").unwrap());
    }
}
