//! CSV-backed expense table
//!
//! The table has four columns: `Date, Amount, Category, Description`.
//! Columns are located by header name, so extra or reordered columns from
//! hand-edited files still load. The derived month is never written; it is
//! recomputed from `Date` on every aggregation.
//!
//! Saves replace the whole file. Content is written to a temp file in the
//! same directory and then persisted over the target.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Column headers in the order they are written
pub const HEADERS: [&str; 4] = ["Date", "Amount", "Category", "Description"];

/// Category used when a row leaves it blank
pub const FALLBACK_CATEGORY: &str = "Other";

/// File-backed store for the transaction table
#[derive(Debug, Clone)]
pub struct TransactionStore {
    path: PathBuf,
}

impl TransactionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all transactions, sorted by date
    ///
    /// A missing file is an empty table, not an error.
    pub fn load(&self) -> Result<Vec<Transaction>> {
        if !self.path.exists() {
            debug!("No expenses file at {}", self.path.display());
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let transactions = parse_csv(file)?;
        debug!(
            "Loaded {} transactions from {}",
            transactions.len(),
            self.path.display()
        );
        Ok(transactions)
    }

    /// Overwrite the table with `transactions`
    pub fn save(&self, transactions: &[Transaction]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        write_csv(tmp.as_file_mut(), transactions)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(
            "Saved {} transactions to {}",
            transactions.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Move the current file aside to `<name>.bak`, replacing any older backup
    ///
    /// Returns the backup path, or `None` when there was no file to move.
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        let backup = self.path.with_file_name(name);
        fs::rename(&self.path, &backup)?;
        info!(
            "Moved {} to {}",
            self.path.display(),
            backup.display()
        );
        Ok(Some(backup))
    }
}

struct HeaderIndex {
    date: usize,
    amount: usize,
    category: Option<usize>,
    description: Option<usize>,
}

impl HeaderIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date = find("date").ok_or_else(|| Error::MalformedRecord {
            line: 1,
            reason: "missing 'Date' column".to_string(),
        })?;
        let amount = find("amount").ok_or_else(|| Error::MalformedRecord {
            line: 1,
            reason: "missing 'Amount' column".to_string(),
        })?;

        Ok(Self {
            date,
            amount,
            category: find("category"),
            description: find("description"),
        })
    }
}

/// Parse an expenses table from any reader, sorted by date
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let index = HeaderIndex::from_headers(&headers)?;

    let mut transactions = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // Blank trailing lines from spreadsheet exports
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let date_str = field(&record, index.date).ok_or_else(|| Error::MalformedRecord {
            line,
            reason: "missing date".to_string(),
        })?;
        let date = parse_date(date_str).ok_or_else(|| Error::MalformedRecord {
            line,
            reason: format!("unable to parse date: {}", date_str),
        })?;

        let amount_str = field(&record, index.amount).ok_or_else(|| Error::MalformedRecord {
            line,
            reason: "missing amount".to_string(),
        })?;
        let amount = parse_amount(amount_str).ok_or_else(|| Error::MalformedRecord {
            line,
            reason: format!("unable to parse amount: {}", amount_str),
        })?;
        if amount < 0.0 {
            return Err(Error::MalformedRecord {
                line,
                reason: format!("negative amount: {}", amount_str),
            });
        }

        let category = index
            .category
            .and_then(|i| field(&record, i))
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string();
        let description = index
            .description
            .and_then(|i| field(&record, i))
            .map(str::to_string);

        transactions.push(Transaction {
            date,
            amount,
            category,
            description,
        });
    }

    // Stable: same-day rows keep file order
    transactions.sort_by_key(|t| t.date);

    debug!("Parsed {} transactions", transactions.len());
    Ok(transactions)
}

/// Write the table (with header row) to `writer`
pub fn write_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADERS)?;
    for tx in transactions {
        wtr.write_record([
            tx.date.format("%Y-%m-%d").to_string(),
            tx.amount.to_string(),
            tx.category.clone(),
            tx.description.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn field(record: &StringRecord, index: usize) -> Option<&str> {
    record.get(index).filter(|s| !s.is_empty())
}

/// Parse a date in the formats the table has been written with over time
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let date_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%Y/%m/%d", // 2024/01/15
        "%Y.%m.%d", // 2024.01.15
        "%m/%d/%Y", // 01/15/2024
        "%d/%m/%Y", // 15/01/2024 (European)
        "%m-%d-%Y", // 01-15-2024
        "%d-%m-%Y", // 15-01-2024
        "%d.%m.%Y", // 15.01.2024
    ];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // %.f also accepts a missing fractional part
    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S%.f", // 2024-01-15 00:00:00.000
        "%Y-%m-%dT%H:%M:%S%.f", // 2024-01-15T00:00:00.000
        "%Y/%m/%d %H:%M:%S%.f", // 2024/01/15 00:00:00
        "%Y-%m-%d %H:%M",       // 2024-01-15 00:00
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Parse an amount, tolerating currency symbols and thousands separators
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '₹' | '€' | '£' | ',' | ' '))
        .collect();

    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}
