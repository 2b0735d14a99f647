use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CashbookError, Result};
use crate::store::{Backend, StoreConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default = "default_csv_file")]
    pub csv_file: String,
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

fn default_backend() -> Backend {
    Backend::Sqlite
}

fn default_csv_file() -> String {
    "transactions.csv".to_string()
}

fn default_db_file() -> String {
    "transactions.db".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            backend: default_backend(),
            csv_file: default_csv_file(),
            db_file: default_db_file(),
        }
    }
}

impl Settings {
    /// Apply per-invocation overrides from the command line.
    pub fn with_overrides(mut self, data_dir: Option<&str>, backend: Option<Backend>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = shellexpand_path(dir);
        }
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self
    }

    pub fn store_config(&self) -> StoreConfig {
        let dir = PathBuf::from(&self.data_dir);
        StoreConfig {
            backend: self.backend,
            csv_path: dir.join(&self.csv_file),
            db_path: dir.join(&self.db_file),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cashbook")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("cashbook")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    match std::fs::read_to_string(&path).map(|content| serde_json::from_str(&content)) {
        Ok(Ok(settings)) => settings,
        Ok(Err(e)) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable settings");
            Settings::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CashbookError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            data_dir: "/tmp/books".to_string(),
            backend: Backend::Csv,
            csv_file: "ledger.csv".to_string(),
            db_file: "ledger.db".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        assert!(json.contains("\"backend\": \"csv\""));
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.backend, Backend::Sqlite);
        assert_eq!(s.csv_file, "transactions.csv");
        assert_eq!(s.db_file, "transactions.db");
        assert!(s.data_dir.ends_with("cashbook"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"data_dir": "/tmp/books"}"#).unwrap();
        assert_eq!(s.backend, Backend::Sqlite);
        assert_eq!(s.db_file, "transactions.db");
    }

    #[test]
    fn test_store_config_joins_data_dir() {
        let s: Settings = serde_json::from_str(r#"{"data_dir": "/tmp/books", "backend": "csv"}"#).unwrap();
        let config = s.store_config();
        assert_eq!(config.backend, Backend::Csv);
        assert_eq!(config.csv_path, PathBuf::from("/tmp/books/transactions.csv"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/books/transactions.db"));
        assert_eq!(config.active_path(), config.csv_path.as_path());
    }

    #[test]
    fn test_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_string_lossy().to_string();
        let s = Settings::default().with_overrides(Some(&dir_str), Some(Backend::Csv));
        assert_eq!(s.backend, Backend::Csv);
        assert_eq!(PathBuf::from(&s.data_dir), std::fs::canonicalize(dir.path()).unwrap());

        let untouched = Settings::default().with_overrides(None, None);
        assert_eq!(untouched, Settings::default());
    }
}
