use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use crate::error::{CashbookError, Result};
use crate::models::{Direction, Transaction};

pub const UNCATEGORIZED: &str = "Uncategorized";

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Balance {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

pub fn balance(txns: &[Transaction]) -> Balance {
    let (income, expense) = totals(txns.iter());
    Balance {
        income,
        expense,
        balance: income - expense,
    }
}

fn totals<'a>(txns: impl Iterator<Item = &'a Transaction>) -> (f64, f64) {
    txns.fold((0.0, 0.0), |(income, expense), t| match t.direction {
        Direction::Income => (income + t.amount, expense),
        Direction::Expense => (income, expense + t.amount),
    })
}

// ---------------------------------------------------------------------------
// Monthly report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

/// Totals for records whose date starts with `month` (`YYYY-MM`).
pub fn monthly_report(txns: &[Transaction], month: &str) -> MonthlyReport {
    let (income, expense) = totals(txns.iter().filter(|t| t.date.starts_with(month)));
    MonthlyReport {
        month: month.to_string(),
        income,
        expense,
        net: income - expense,
    }
}

pub fn validate_month(month: &str) -> Result<()> {
    let re = Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").map_err(|e| CashbookError::Other(e.to_string()))?;
    if re.is_match(month) {
        Ok(())
    } else {
        Err(CashbookError::InvalidMonth(month.to_string()))
    }
}

pub fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

// ---------------------------------------------------------------------------
// Expense breakdown by category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Expense totals per category, largest first.
pub fn expense_by_category(txns: &[Transaction]) -> Vec<CategoryTotal> {
    let mut by_cat: HashMap<&str, f64> = HashMap::new();
    for t in txns.iter().filter(|t| t.direction == Direction::Expense) {
        let name = t
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        *by_cat.entry(name).or_default() += t.amount;
    }
    let mut result: Vec<CategoryTotal> = by_cat
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    result.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    result
}

// ---------------------------------------------------------------------------
// Monthly net series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthNet {
    pub month: String,
    pub net: f64,
}

/// Net per `YYYY-MM` for the most recent `limit` months, oldest first.
pub fn monthly_net(txns: &[Transaction], limit: usize) -> Vec<MonthNet> {
    let mut by_month: BTreeMap<&str, f64> = BTreeMap::new();
    for t in txns {
        if let Some(month) = t.month() {
            *by_month.entry(month).or_default() += t.signed_amount();
        }
    }
    let skip = by_month.len().saturating_sub(limit);
    by_month
        .into_iter()
        .skip(skip)
        .map(|(month, net)| MonthNet {
            month: month.to_string(),
            net,
        })
        .collect()
}
