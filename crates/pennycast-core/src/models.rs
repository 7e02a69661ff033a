//! Domain models for Pennycast

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Always non-negative; expenses only
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
}

impl Transaction {
    /// Calendar month this transaction falls in
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}

/// A new expense as entered by the user (before validation)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Validate user input and turn it into a stored transaction
    pub fn validate(self) -> crate::Result<Transaction> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(crate::Error::InvalidData(format!(
                "Amount must be a non-negative number, got {}",
                self.amount
            )));
        }

        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(crate::Error::InvalidData(
                "Category must not be empty".to_string(),
            ));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Transaction {
            date: self.date,
            amount: self.amount,
            category,
            description,
        })
    }
}

/// Partial update to an existing transaction; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct TransactionEdit {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

impl TransactionEdit {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }

    /// Apply this edit on top of an existing transaction
    pub fn apply(self, existing: &Transaction) -> crate::Result<Transaction> {
        NewTransaction {
            date: self.date.unwrap_or(existing.date),
            amount: self.amount.unwrap_or(existing.amount),
            category: self.category.unwrap_or_else(|| existing.category.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
        }
        .validate()
    }
}

/// A calendar month period (e.g. 2024-07)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar months elapsed since `earlier` (negative if `earlier` is later)
    pub fn months_since(&self, earlier: YearMonth) -> i64 {
        (self.year as i64 - earlier.year as i64) * 12 + (self.month as i64 - earlier.month as i64)
    }

    /// The following calendar month
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of this month
    pub fn first_day(&self) -> NaiveDate {
        // month is always 1..=12, so day 1 exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month: {} (expected YYYY-MM)", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month number in month: {}", s))?;
        Self::new(year, month).ok_or_else(|| format!("Month out of range: {}", s))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Total spend for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub amount: f64,
    /// Months elapsed since the earliest month in the data set
    pub month_index: i64,
    pub transaction_count: usize,
}

/// One (month_index, amount) observation for the forecaster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingPoint {
    pub month_index: i64,
    pub amount: f64,
}

impl From<(i64, f64)> for TrainingPoint {
    fn from((month_index, amount): (i64, f64)) -> Self {
        Self {
            month_index,
            amount,
        }
    }
}

/// A spending category in the breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Spending on a single day (zero-filled between first and last date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A bar in the forecast chart: historical months plus the predicted one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: String,
    pub amount: f64,
    pub forecast: bool,
}
