use thiserror::Error;

#[derive(Error, Debug)]
pub enum CashbookError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid direction: '{0}' (expected income or expense)")]
    InvalidDirection(String),

    #[error("Invalid month: '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl CashbookError {
    /// Bad user input, as opposed to a storage or environment failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidDirection(_) | Self::InvalidMonth(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CashbookError>;
