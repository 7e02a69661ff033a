//! Pennycast Core Library
//!
//! Shared functionality for the Pennycast expense forecaster:
//! - Monthly aggregation with gap-resilient month indices
//! - Next-month forecasting with pluggable regressors
//! - CSV expense table and JSON model persistence
//! - Budget comparison and dashboard views
//! - Settings and explicit session state

pub mod aggregate;
pub mod budget;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod model_store;
pub mod models;
pub mod session;
pub mod store;

/// Test utilities for building fixtures
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{aggregate_monthly, training_points};
pub use budget::{check_budget, format_amount, next_month_label, BudgetCheck, BudgetStatus};
pub use config::Settings;
pub use dashboard::{Dashboard, Forecast};
pub use error::{Error, Result};
pub use forecast::{
    BoostedTrees, BoostingParams, Forecaster, LinearTrend, Model, Regressor, RegressorKind,
};
pub use model_store::{ModelStore, StoredModel};
pub use models::{
    CategorySpending, DailyTotal, ForecastPoint, MonthlyTotal, NewTransaction, TrainingPoint,
    Transaction, TransactionEdit, YearMonth,
};
pub use session::{CommitReport, Session, TrainOutcome};
pub use store::TransactionStore;
