//! Test utilities for building transactions and temporary sessions

use chrono::NaiveDate;
use tempfile::TempDir;

use crate::config::Settings;
use crate::models::Transaction;

/// Parse a `YYYY-MM-DD` date, panicking on bad input
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Build a transaction with no description
pub fn tx(date_str: &str, amount: f64, category: &str) -> Transaction {
    Transaction {
        date: date(date_str),
        amount,
        category: category.to_string(),
        description: None,
    }
}

/// Settings rooted in a fresh temp directory
///
/// Keep the returned `TempDir` alive for as long as the settings are used.
pub fn temp_settings() -> (TempDir, Settings) {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        currency_symbol: "$".to_string(),
        ..Settings::default()
    };
    (dir, settings)
}

/// One transaction per month for consecutive months starting at `start`
pub fn monthly_series(start_year: i32, start_month: u32, amounts: &[f64]) -> Vec<Transaction> {
    let mut year = start_year;
    let mut month = start_month;
    let mut transactions = Vec::with_capacity(amounts.len());
    for &amount in amounts {
        transactions.push(Transaction {
            date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
            amount,
            category: "Other".to_string(),
            description: None,
        });
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    transactions
}
