use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::amount;
use crate::reports;
use crate::store::{Store, StoreConfig};

pub fn balance(config: &StoreConfig) -> Result<()> {
    let store = Store::open(config)?;
    let b = reports::balance(&store.list_all()?);
    println!("Income total : {}", amount(b.income));
    println!("Expense total: {}", amount(b.expense));
    println!("Balance      : {}", amount(b.balance));
    Ok(())
}

pub fn monthly(config: &StoreConfig, month: Option<String>) -> Result<()> {
    let month = month.unwrap_or_else(reports::current_month);
    reports::validate_month(&month)?;
    let store = Store::open(config)?;
    let r = reports::monthly_report(&store.list_all()?, &month);
    println!("Report for {}:", r.month);
    println!("  Income : {}", amount(r.income));
    println!("  Expense: {}", amount(r.expense));
    println!("  Net    : {}", amount(r.net));
    Ok(())
}

pub fn dashboard(config: &StoreConfig, months: usize) -> Result<()> {
    let store = Store::open(config)?;
    let txns = store.list_all()?;
    let b = reports::balance(&txns);

    let mut totals = Table::new();
    totals.set_header(vec!["", "Amount"]);
    totals.add_row(vec![Cell::new("Income".green().bold()), right(amount(b.income))]);
    totals.add_row(vec![Cell::new("Expense".red().bold()), right(amount(b.expense))]);
    let label = if b.balance >= 0.0 {
        "Balance".green().bold()
    } else {
        "Balance".red().bold()
    };
    totals.add_row(vec![Cell::new(label), right(amount(b.balance))]);
    println!("Totals\n{totals}");

    let categories = reports::expense_by_category(&txns);
    if !categories.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount", "%"]);
        for item in &categories {
            let pct = if b.expense != 0.0 { item.total / b.expense * 100.0 } else { 0.0 };
            table.add_row(vec![
                Cell::new(&item.category),
                right(amount(item.total)),
                right(format!("{pct:.1}%")),
            ]);
        }
        println!("\nExpenses by Category\n{table}");
    }

    let series = reports::monthly_net(&txns, months);
    if !series.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Month", "Net"]);
        for m in &series {
            table.add_row(vec![Cell::new(&m.month), right(amount(m.net))]);
        }
        println!("\nMonthly Net\n{table}");
    }
    Ok(())
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}
