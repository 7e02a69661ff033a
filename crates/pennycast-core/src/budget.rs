//! Budget comparison for the next-month forecast

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::YearMonth;

/// Where the forecast lands relative to the budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BudgetStatus {
    /// No positive budget configured
    NotSet,
    Over { overage: f64 },
    /// Includes a forecast exactly equal to the budget
    Under { remaining: f64 },
}

/// Result of comparing a forecast against the budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCheck {
    #[serde(flatten)]
    pub status: BudgetStatus,
    pub message: String,
}

impl BudgetCheck {
    pub fn is_over(&self) -> bool {
        matches!(self.status, BudgetStatus::Over { .. })
    }
}

/// Compare a predicted total against the monthly budget
pub fn check_budget(prediction: f64, budget: f64, currency: &str) -> BudgetCheck {
    if budget <= 0.0 {
        return BudgetCheck {
            status: BudgetStatus::NotSet,
            message: "Set a budget to get a comparison.".to_string(),
        };
    }

    if prediction > budget {
        let overage = prediction - budget;
        BudgetCheck {
            status: BudgetStatus::Over { overage },
            message: format!(
                "Warning: Predicted expense ({}) is {} over your budget of {}!",
                format_amount(prediction, currency),
                format_amount(overage, currency),
                format_amount(budget, currency)
            ),
        }
    } else {
        let remaining = budget - prediction;
        BudgetCheck {
            status: BudgetStatus::Under { remaining },
            message: format!(
                "Good News: Predicted expense ({}) is {} under your budget of {}.",
                format_amount(prediction, currency),
                format_amount(remaining, currency),
                format_amount(budget, currency)
            ),
        }
    }
}

/// Format an amount with currency symbol, thousands separators and 2 decimals
pub fn format_amount(amount: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, currency, grouped, frac)
}

/// Label (`YYYY-MM`) for the month being forecast
///
/// With no data, this is the month after `today`.
pub fn next_month_label(last_month: Option<YearMonth>, today: NaiveDate) -> String {
    last_month
        .unwrap_or_else(|| YearMonth::from_date(today))
        .succ()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_budget() {
        let check = check_budget(12500.0, 10000.0, "₹");
        assert!(check.is_over());
        assert_eq!(check.status, BudgetStatus::Over { overage: 2500.0 });
        assert_eq!(
            check.message,
            "Warning: Predicted expense (₹12,500.00) is ₹2,500.00 over your budget of ₹10,000.00!"
        );
    }

    #[test]
    fn test_under_budget() {
        let check = check_budget(7250.5, 10000.0, "$");
        assert!(!check.is_over());
        assert_eq!(
            check.message,
            "Good News: Predicted expense ($7,250.50) is $2,749.50 under your budget of $10,000.00."
        );
    }

    #[test]
    fn test_equal_to_budget_is_not_over() {
        let check = check_budget(10000.0, 10000.0, "$");
        assert!(!check.is_over());
        assert_eq!(check.status, BudgetStatus::Under { remaining: 0.0 });
        assert!(check.message.contains("under"));
    }

    #[test]
    fn test_no_budget() {
        let check = check_budget(500.0, 0.0, "$");
        assert_eq!(check.status, BudgetStatus::NotSet);
        assert_eq!(check.message, "Set a budget to get a comparison.");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0, "$"), "$0.00");
        assert_eq!(format_amount(999.994, "$"), "$999.99");
        assert_eq!(format_amount(1000.0, "$"), "$1,000.00");
        assert_eq!(format_amount(1234567.891, "₹"), "₹1,234,567.89");
        assert_eq!(format_amount(-42.5, "$"), "-$42.50");
    }

    #[test]
    fn test_next_month_label() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        assert_eq!(
            next_month_label(YearMonth::new(2024, 7), today),
            "2024-08"
        );
        assert_eq!(next_month_label(None, today), "2025-01");
    }

    #[test]
    fn test_check_serializes_flat() {
        let check = check_budget(11.0, 10.0, "$");
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["status"], "over");
        assert_eq!(json["overage"], 1.0);
    }
}
