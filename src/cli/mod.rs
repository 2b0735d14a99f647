pub mod add;
pub mod export;
pub mod init;
pub mod list;
pub mod migrate;
pub mod report;
pub mod status;

use clap::{Parser, Subcommand};

use crate::models::Direction;
use crate::store::Backend;

#[derive(Parser)]
#[command(name = "cashbook", about = "Personal income/expense ledger with CSV or SQLite storage.")]
pub struct Cli {
    /// Data directory for this run (overrides settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
    /// Storage backend for this run (overrides settings)
    #[arg(long, value_enum, global = true)]
    pub backend: Option<Backend>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save settings and create the data directory and store.
    Init,
    /// Add a transaction (prompts for anything required that is missing).
    Add {
        /// Amount as a positive magnitude
        #[arg(long)]
        amount: Option<f64>,
        /// income or expense
        #[arg(long, value_enum, ignore_case = true)]
        direction: Option<Direction>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma separated tags
        #[arg(long)]
        tags: Option<String>,
        /// ISO 8601 date/time (default: now)
        #[arg(long)]
        date: Option<String>,
        /// Record id; an existing record with this id is replaced
        #[arg(long)]
        id: Option<String>,
    },
    /// List recent transactions, newest first.
    List {
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Show income total, expense total and balance.
    Balance,
    /// Show income, expense and net for one month.
    Monthly {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Show totals, expenses by category and recent monthly net.
    Dashboard {
        /// Number of months in the net series
        #[arg(long, default_value = "12")]
        months: usize,
    },
    /// Export every transaction to a CSV file.
    Export {
        #[arg(long, default_value = "transactions-export.csv")]
        out: String,
    },
    /// Import the CSV store (or --from file) into the SQLite store.
    Migrate {
        /// CSV file to import (default: the configured CSV store)
        #[arg(long)]
        from: Option<String>,
    },
    /// Show current settings and store summary.
    Status,
}
