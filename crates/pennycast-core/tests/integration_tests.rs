//! Integration tests for pennycast-core
//!
//! These tests exercise the full upload → aggregate → train → forecast workflow.

use std::fs;

use chrono::NaiveDate;
use pennycast_core::{
    aggregate_monthly, BudgetStatus, Model, NewTransaction, Regressor, RegressorKind, Session,
    Settings, TransactionStore,
};
use tempfile::TempDir;

/// Three months of groceries and rent with a gap-free linear trend in totals
fn quarter_csv() -> &'static str {
    "Date,Amount,Category,Description
2024-01-03,60,Groceries,Market
2024-01-28,40,Rent,
2024-02-04,150,Groceries,Market
2024-02-20,50,Rent,
2024-03-01,\"₹200\",Groceries,Market
2024-03-15,100,Rent,Late fee"
}

fn settings_in(dir: &TempDir, currency: &str, budget: f64) -> Settings {
    Settings {
        data_dir: dir.path().to_path_buf(),
        currency_symbol: currency.to_string(),
        budget,
        ..Settings::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
}

// =============================================================================
// Upload and Forecast Workflow
// =============================================================================

#[test]
fn test_upload_train_forecast_workflow() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let upload = dir.path().join("upload.csv");
    fs::write(&upload, quarter_csv()).unwrap();

    let settings = settings_in(&dir, "₹", 350.0);
    let mut session = Session::open(&settings);
    let report = session.import_csv(&upload).expect("Failed to import CSV");

    assert!(report.is_clean());
    assert!(report.train.is_trained());
    assert_eq!(session.transactions().len(), 6);

    // Monthly totals 100, 200, 300 → linear trend predicts 400
    let forecast = session
        .forecast(today())
        .expect("Forecast failed")
        .expect("Expected a forecast");
    assert_eq!(forecast.month, "2024-04");
    assert_eq!(forecast.month_index, 3);
    assert!((forecast.amount - 400.0).abs() < 1e-6);
    assert_eq!(forecast.budget.status, BudgetStatus::Over { overage: 50.0 });
    assert_eq!(
        forecast.budget.message,
        "Warning: Predicted expense (₹400.00) is ₹50.00 over your budget of ₹350.00!"
    );
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("upload.csv");
    fs::write(&upload, quarter_csv()).unwrap();

    let settings = settings_in(&dir, "$", 0.0);
    {
        let mut session = Session::open(&settings);
        session.import_csv(&upload).unwrap();
    }

    let session = Session::open(&settings);
    assert_eq!(session.transactions().len(), 6);
    let model = session.model().expect("Model should be persisted");
    assert_eq!(model.kind(), RegressorKind::Linear);
    assert!(session.model_trained_at().is_some());

    let forecast = session.forecast(today()).unwrap().unwrap();
    assert!((forecast.amount - 400.0).abs() < 1e-6);
    assert_eq!(forecast.budget.status, BudgetStatus::NotSet);
    assert_eq!(forecast.budget.message, "Set a budget to get a comparison.");
}

#[test]
fn test_dashboard_after_upload() {
    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("upload.csv");
    fs::write(&upload, quarter_csv()).unwrap();

    let settings = settings_in(&dir, "$", 1000.0);
    let mut session = Session::open(&settings);
    session.import_csv(&upload).unwrap();

    let dashboard = session.dashboard(today()).unwrap();
    assert_eq!(dashboard.transaction_count, 6);
    assert!((dashboard.total_expenses - 600.0).abs() < 1e-9);
    assert!((dashboard.average_monthly - 200.0).abs() < 1e-9);
    assert_eq!(dashboard.monthly.len(), 3);
    assert_eq!(dashboard.categories[0].category, "Groceries");
    assert!(dashboard.daily_trend.is_some());

    let series = dashboard.forecast_series();
    assert_eq!(series.len(), 4);
    assert!(series[..3].iter().all(|p| !p.forecast));
    assert!(series[3].forecast);
    assert_eq!(series[3].period, "2024-04");
}

#[test]
fn test_gap_months_keep_true_distance() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir, "$", 0.0);
    let mut session = Session::open(&settings);

    for (date, amount) in [("2024-01-10", 100.0), ("2024-03-10", 300.0)] {
        session
            .add(NewTransaction {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                amount,
                category: "Other".to_string(),
                description: None,
            })
            .unwrap();
    }

    let monthly = aggregate_monthly(session.transactions());
    assert_eq!(
        monthly.iter().map(|m| m.month_index).collect::<Vec<_>>(),
        vec![0, 2]
    );

    // Slope is 100 per month across the gap, so month 3 is 400
    let forecast = session.forecast(today()).unwrap().unwrap();
    assert_eq!(forecast.month_index, 3);
    assert!((forecast.amount - 400.0).abs() < 1e-6);
}

#[test]
fn test_boosted_regressor_end_to_end() {
    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("upload.csv");
    fs::write(&upload, quarter_csv()).unwrap();

    let settings = Settings {
        regressor: RegressorKind::Boosted,
        ..settings_in(&dir, "$", 0.0)
    };
    let mut session = Session::open(&settings);
    session.import_csv(&upload).unwrap();

    assert!(matches!(session.model(), Some(Model::Boosted(_))));
    let forecast = session.forecast(today()).unwrap().unwrap();
    // Trees extrapolate flat from the last leaf
    assert!(forecast.amount > 200.0 && forecast.amount <= 300.0);

    let reopened = Session::open(&settings);
    let again = reopened.forecast(today()).unwrap().unwrap();
    assert_eq!(forecast.amount, again.amount);
}

// =============================================================================
// Degraded Storage
// =============================================================================

#[test]
fn test_corrupt_model_degrades_to_no_forecast() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir, "$", 0.0);
    fs::write(settings.model_path(), "{ not json").unwrap();

    let session = Session::open(&settings);
    assert!(session.model().is_none());
    assert!(session.forecast(today()).unwrap().is_none());
}

#[test]
fn test_corrupt_table_degrades_to_empty() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir, "$", 0.0);
    fs::write(settings.expenses_path(), "Date,Amount\nbad,row\n").unwrap();

    let session = Session::open(&settings);
    assert!(session.transactions().is_empty());
}

#[test]
fn test_saved_table_is_readable_csv() {
    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("upload.csv");
    fs::write(&upload, quarter_csv()).unwrap();

    let settings = settings_in(&dir, "$", 0.0);
    let mut session = Session::open(&settings);
    session.import_csv(&upload).unwrap();

    let saved = fs::read_to_string(settings.expenses_path()).unwrap();
    assert!(saved.starts_with("Date,Amount,Category,Description"));

    let reloaded = TransactionStore::new(settings.expenses_path())
        .load()
        .unwrap();
    assert_eq!(reloaded, session.transactions());
}
