use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::{CashbookError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Direction implied by a signed amount: zero counts as income.
    pub fn from_sign(amount: f64) -> Self {
        if amount >= 0.0 {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CashbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(CashbookError::InvalidDirection(s.trim().to_string())),
        }
    }
}

/// One ledger entry. `amount` is always a magnitude; `direction` carries the sign.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub amount: f64,
    pub direction: Direction,
    pub category: Option<String>,
    pub account: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

impl Transaction {
    /// New record with a fresh id and the current local time as its date.
    pub fn new(amount: f64, direction: Direction) -> Self {
        Self {
            id: new_id(),
            date: now_timestamp(),
            amount,
            direction,
            category: None,
            account: None,
            description: None,
            tags: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_amount(self.amount)?;
        if self.id.trim().is_empty() {
            return Err(CashbookError::Other("Transaction id must not be empty".to_string()));
        }
        Ok(())
    }

    /// Amount with the direction's sign applied.
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            Direction::Income => self.amount,
            Direction::Expense => -self.amount,
        }
    }

    /// `YYYY-MM` prefix of the date, if the date is long enough to have one.
    pub fn month(&self) -> Option<&str> {
        self.date.get(..7)
    }
}

pub fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(CashbookError::InvalidAmount(format!("{amount} is not a finite number")));
    }
    if amount < 0.0 {
        return Err(CashbookError::InvalidAmount(format!(
            "{amount} is negative; record the magnitude and set the direction instead"
        )));
    }
    Ok(())
}

/// Parse user-entered amount text into a validated magnitude.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| CashbookError::InvalidAmount(format!("'{trimmed}' is not a number")))?;
    check_amount(amount)?;
    Ok(amount)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Trim free text and map blank input to `None`.
pub fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
