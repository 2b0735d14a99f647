use colored::Colorize;
use dialoguer::Input;

use crate::error::{CashbookError, Result};
use crate::models::{non_empty, parse_amount, Direction, Transaction};

/// Somewhere answers come from.
pub trait FieldSource {
    fn ask(&mut self, prompt: &str) -> Result<String>;
    fn warn(&mut self, message: &str);
}

/// Interactive terminal prompts.
pub struct Terminal;

impl FieldSource for Terminal {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{}", message.red());
    }
}

/// Whatever the caller already knows about the new record.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub id: Option<String>,
    pub amount: Option<f64>,
    pub direction: Option<Direction>,
    pub category: Option<String>,
    pub account: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub date: Option<String>,
}

impl Draft {
    pub fn is_complete(&self) -> bool {
        self.amount.is_some() && self.direction.is_some()
    }

    fn finish(self, amount: f64, direction: Direction) -> Transaction {
        let mut txn = Transaction::new(amount, direction);
        if let Some(id) = non_empty(self.id.as_deref()) {
            txn.id = id;
        }
        if let Some(date) = non_empty(self.date.as_deref()) {
            txn.date = date;
        }
        txn.category = non_empty(self.category.as_deref());
        txn.account = non_empty(self.account.as_deref());
        txn.description = non_empty(self.description.as_deref());
        txn.tags = non_empty(self.tags.as_deref());
        txn
    }

    /// Build the record from supplied fields only; amount and direction must be present.
    pub fn into_transaction(self) -> Result<Transaction> {
        let amount = self
            .amount
            .ok_or_else(|| CashbookError::InvalidAmount("amount is required".to_string()))?;
        let direction = self
            .direction
            .ok_or_else(|| CashbookError::InvalidDirection(String::new()))?;
        Ok(self.finish(amount, direction))
    }
}

/// Ask `source` for every field `draft` is missing. Required fields are
/// re-asked until valid; optional fields are asked once and blank input
/// leaves them unset.
pub fn collect(source: &mut impl FieldSource, mut draft: Draft) -> Result<Transaction> {
    let amount = match draft.amount {
        Some(a) => a,
        None => ask_until_valid(source, "Amount", parse_amount)?,
    };
    let direction = match draft.direction {
        Some(d) => d,
        None => ask_until_valid(source, "Direction (income/expense)", |s| s.parse::<Direction>())?,
    };
    ask_optional(source, &mut draft.category, "Category (optional)")?;
    ask_optional(source, &mut draft.account, "Account (optional)")?;
    ask_optional(source, &mut draft.description, "Description (optional)")?;
    ask_optional(source, &mut draft.tags, "Tags (comma separated, optional)")?;
    ask_optional(source, &mut draft.date, "Date (ISO 8601, leave blank for now)")?;
    Ok(draft.finish(amount, direction))
}

fn ask_until_valid<T>(
    source: &mut impl FieldSource,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T>,
) -> Result<T> {
    loop {
        let raw = source.ask(prompt)?;
        match parse(&raw) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_validation() => source.warn(&e.to_string()),
            Err(e) => return Err(e),
        }
    }
}

fn ask_optional(source: &mut impl FieldSource, slot: &mut Option<String>, prompt: &str) -> Result<()> {
    if non_empty(slot.as_deref()).is_none() {
        *slot = non_empty(Some(source.ask(prompt)?.as_str()));
    }
    Ok(())
}
