//! Expense table commands (add, list, edit, delete, import, categories)

use std::path::Path;

use anyhow::{Context, Result};
use pennycast_core::{format_amount, NewTransaction, Session, TransactionEdit};

use super::core::{open_session, parse_date_arg, print_commit, row_index, today, GlobalOpts};
use super::truncate;

pub fn cmd_add(
    opts: &GlobalOpts,
    amount: f64,
    category: &str,
    date: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let mut session = open_session(opts)?;

    let date = match date {
        Some(s) => parse_date_arg(s)?,
        None => today(),
    };

    let report = session
        .add(NewTransaction {
            date,
            amount,
            category: category.to_string(),
            description: description.map(str::to_string),
        })
        .context("Failed to add expense")?;

    println!(
        "✅ Added {} ({}) on {}",
        format_amount(amount, session.currency_symbol()),
        category.trim(),
        date
    );
    print_commit(&report);

    Ok(())
}

pub fn cmd_list(opts: &GlobalOpts, limit: Option<usize>, json: bool) -> Result<()> {
    let session = open_session(opts)?;
    if json {
        println!("{}", list_json(&session, limit)?);
        return Ok(());
    }

    let transactions = session.transactions();
    let skip = list_skip(transactions.len(), limit);

    if transactions.is_empty() {
        println!("No expenses recorded yet. Add one with:");
        println!("  pennycast add --amount 250 --category Groceries");
        return Ok(());
    }

    println!();
    println!("📝 Expenses ({} total)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>4} │ {:10} │ {:>12} │ {:14} │ {}",
        "Row", "Date", "Amount", "Category", "Description"
    );
    println!("   ─────┼────────────┼──────────────┼────────────────┼────────────");

    for (i, tx) in transactions.iter().enumerate().skip(skip) {
        println!(
            "   {:>4} │ {} │ {:>12.2} │ {:14} │ {}",
            i + 1,
            tx.date,
            tx.amount,
            truncate(&tx.category, 14),
            truncate(tx.description.as_deref().unwrap_or(""), 30)
        );
    }

    Ok(())
}

/// The last `limit` transactions as a JSON array
pub fn list_json(session: &Session, limit: Option<usize>) -> Result<String> {
    let transactions = session.transactions();
    let skip = list_skip(transactions.len(), limit);
    Ok(serde_json::to_string_pretty(&transactions[skip..])?)
}

fn list_skip(len: usize, limit: Option<usize>) -> usize {
    limit.map(|n| len.saturating_sub(n)).unwrap_or(0)
}

pub fn cmd_edit(
    opts: &GlobalOpts,
    row: usize,
    amount: Option<f64>,
    category: Option<&str>,
    date: Option<&str>,
    description: Option<&str>,
    clear_description: bool,
) -> Result<()> {
    let index = row_index(row)?;
    let mut session = open_session(opts)?;

    let edit = TransactionEdit {
        date: date.map(parse_date_arg).transpose()?,
        amount,
        category: category.map(str::to_string),
        description: if clear_description {
            Some(None)
        } else {
            description.map(|d| Some(d.to_string()))
        },
    };

    if edit.is_empty() {
        println!("Nothing to change. Pass --amount, --category, --date or --description.");
        return Ok(());
    }

    let report = session
        .update(index, edit)
        .with_context(|| format!("Failed to edit row {}", row))?;

    println!("✅ Updated row {}", row);
    print_commit(&report);

    Ok(())
}

pub fn cmd_delete(opts: &GlobalOpts, row: usize) -> Result<()> {
    let index = row_index(row)?;
    let mut session = open_session(opts)?;

    let (removed, report) = session
        .delete(index)
        .with_context(|| format!("Failed to delete row {}", row))?;

    println!(
        "🗑️  Deleted {} ({}) on {}",
        format_amount(removed.amount, session.currency_symbol()),
        removed.category,
        removed.date
    );
    print_commit(&report);

    Ok(())
}

pub fn cmd_import(opts: &GlobalOpts, file: &Path) -> Result<()> {
    println!("📥 Importing expenses from {}...", file.display());

    let mut session = open_session(opts)?;
    let report = session
        .import_csv(file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!(
        "✅ Loaded {} expenses (previous data replaced)",
        session.transactions().len()
    );
    print_commit(&report);

    Ok(())
}

pub fn cmd_categories(opts: &GlobalOpts) -> Result<()> {
    let session = open_session(opts)?;

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");
    for category in session.categories() {
        println!("   {}", category);
    }

    Ok(())
}
