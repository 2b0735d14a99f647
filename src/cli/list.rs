use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::amount;
use crate::models::Direction;
use crate::store::{Store, StoreConfig};

pub fn run(config: &StoreConfig, limit: usize) -> Result<()> {
    let store = Store::open(config)?;
    let txns = store.list_all()?;
    if txns.is_empty() {
        println!("No transactions recorded.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Direction", "Amount", "Category", "Account", "Description"]);
    for txn in txns.iter().take(limit) {
        let direction = match txn.direction {
            Direction::Income => txn.direction.as_str().green(),
            Direction::Expense => txn.direction.as_str().red(),
        };
        table.add_row(vec![
            Cell::new(txn.id.chars().take(8).collect::<String>()),
            Cell::new(&txn.date),
            Cell::new(direction),
            Cell::new(amount(txn.amount)).set_alignment(CellAlignment::Right),
            Cell::new(txn.category.as_deref().unwrap_or_default()),
            Cell::new(txn.account.as_deref().unwrap_or_default()),
            Cell::new(txn.description.as_deref().unwrap_or_default()),
        ]);
    }
    println!(
        "Transactions (showing {} of {})\n{table}",
        limit.min(txns.len()),
        txns.len()
    );
    Ok(())
}
