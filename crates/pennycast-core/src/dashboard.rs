//! Dashboard views
//!
//! Summary metrics plus the data behind the three dashboard charts:
//! monthly history with forecast, category breakdown and daily trend.
//! Rendering is left to the presentation layer.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::aggregate::aggregate_monthly;
use crate::budget::{check_budget, next_month_label, BudgetCheck};
use crate::error::Result;
use crate::forecast::{Forecaster, Model};
use crate::models::{CategorySpending, DailyTotal, ForecastPoint, MonthlyTotal, Transaction};

/// Next-month forecast with its budget comparison
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    /// `YYYY-MM` of the forecast month
    pub month: String,
    pub month_index: i64,
    pub amount: f64,
    pub budget: BudgetCheck,
}

/// Everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_expenses: f64,
    pub average_monthly: f64,
    pub transaction_count: usize,
    pub monthly: Vec<MonthlyTotal>,
    pub forecast: Option<Forecast>,
    pub categories: Vec<CategorySpending>,
    pub daily_trend: Option<Vec<DailyTotal>>,
}

impl Dashboard {
    pub fn build(
        transactions: &[Transaction],
        model: Option<&Model>,
        budget: f64,
        currency: &str,
        today: NaiveDate,
    ) -> Result<Self> {
        let monthly = aggregate_monthly(transactions);
        let total_expenses: f64 = transactions.iter().map(|t| t.amount).sum();
        let average_monthly = if monthly.is_empty() {
            0.0
        } else {
            monthly.iter().map(|m| m.amount).sum::<f64>() / monthly.len() as f64
        };

        let forecast = match model {
            Some(model) => forecast_next(&monthly, model, budget, currency, today)?,
            None => None,
        };

        Ok(Self {
            total_expenses,
            average_monthly,
            transaction_count: transactions.len(),
            categories: category_breakdown(transactions),
            daily_trend: daily_trend(transactions),
            monthly,
            forecast,
        })
    }

    /// Bars for the forecast chart: history followed by the predicted month
    pub fn forecast_series(&self) -> Vec<ForecastPoint> {
        let mut series: Vec<ForecastPoint> = self
            .monthly
            .iter()
            .map(|m| ForecastPoint {
                period: m.month.to_string(),
                amount: m.amount,
                forecast: false,
            })
            .collect();

        if let Some(forecast) = &self.forecast {
            series.push(ForecastPoint {
                period: forecast.month.clone(),
                amount: forecast.amount,
                forecast: true,
            });
        }
        series
    }
}

/// Predict the month after the latest one present
///
/// Returns `None` when there is no monthly data to anchor the forecast.
pub fn forecast_next(
    monthly: &[MonthlyTotal],
    model: &Model,
    budget: f64,
    currency: &str,
    today: NaiveDate,
) -> Result<Option<Forecast>> {
    let Some(last) = monthly.last() else {
        return Ok(None);
    };

    let amount = Forecaster::predict_next(Some(model), last.month_index)?;
    Ok(Some(Forecast {
        month: next_month_label(Some(last.month), today),
        month_index: last.month_index + 1,
        amount,
        budget: check_budget(amount, budget, currency),
    }))
}

/// Spend per category, largest first
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategorySpending> {
    let mut by_category: HashMap<&str, (f64, usize)> = HashMap::new();
    for tx in transactions {
        let entry = by_category.entry(tx.category.as_str()).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let total: f64 = by_category.values().map(|(amount, _)| amount).sum();
    let mut categories: Vec<CategorySpending> = by_category
        .into_iter()
        .map(|(category, (amount, transaction_count))| CategorySpending {
            category: category.to_string(),
            amount,
            percentage: if total > 0.0 {
                amount / total * 100.0
            } else {
                0.0
            },
            transaction_count,
        })
        .collect();

    categories.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    categories
}

/// Daily totals from first to last date, zero-filled
///
/// `None` when fewer than two distinct dates exist.
pub fn daily_trend(transactions: &[Transaction]) -> Option<Vec<DailyTotal>> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for tx in transactions {
        *by_day.entry(tx.date).or_insert(0.0) += tx.amount;
    }
    if by_day.len() < 2 {
        return None;
    }

    let (&first, _) = by_day.iter().next()?;
    let (&last, _) = by_day.iter().next_back()?;

    let mut trend = Vec::new();
    let mut day = first;
    while day <= last {
        trend.push(DailyTotal {
            date: day,
            amount: by_day.get(&day).copied().unwrap_or(0.0),
        });
        day += Duration::days(1);
    }
    Some(trend)
}
