//! Session state
//!
//! A [`Session`] owns the current transaction set, the latest fitted model
//! and the budget. It is passed explicitly to every operation. Each mutation
//! runs the full cycle before returning: sort, save the table, retrain, and
//! save the model.
//!
//! The session is the persistence boundary. A failed load degrades to "no
//! data" or "no model" with a warning. A failed save is reported in the
//! [`CommitReport`] and does not roll back the in-memory change.
//!
//! An expenses file that exists but cannot be read is never overwritten by
//! the empty view: row edits and retraining fail with
//! [`Error::UnreadableStore`], and a whole-table replacement first moves the
//! file aside to `<name>.bak`.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::aggregate::{aggregate_monthly, distinct_months, training_points};
use crate::config::Settings;
use crate::dashboard::{forecast_next, Dashboard, Forecast};
use crate::error::{Error, Result};
use crate::forecast::{Forecaster, Model, MIN_TRAINING_MONTHS};
use crate::model_store::ModelStore;
use crate::models::{NewTransaction, Transaction, TransactionEdit};
use crate::store::{self, TransactionStore};

/// Outcome of a retrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    /// A new model replaced the previous one
    Trained { months: usize },
    /// Fewer than two distinct months; any previous model was dropped
    NotEnoughData { months: usize },
    /// The regressor rejected the data; any previous model was dropped
    Failed { months: usize },
}

impl TrainOutcome {
    pub fn is_trained(&self) -> bool {
        matches!(self, Self::Trained { .. })
    }
}

/// What happened during a commit
#[derive(Debug)]
pub struct CommitReport {
    pub train: TrainOutcome,
    /// Save and training failures that were logged and swallowed
    pub warnings: Vec<String>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Explicit application state for one interactive session
pub struct Session {
    store: TransactionStore,
    model_store: ModelStore,
    forecaster: Forecaster,
    transactions: Vec<Transaction>,
    model: Option<Model>,
    model_trained_at: Option<DateTime<Utc>>,
    budget: f64,
    currency_symbol: String,
    default_categories: Vec<String>,
    load_error: Option<String>,
}

impl Session {
    /// Open a session, loading persisted transactions and model
    pub fn open(settings: &Settings) -> Self {
        let store = TransactionStore::new(settings.expenses_path());
        let model_store = ModelStore::new(settings.model_path());

        let (transactions, load_error) = match store.load() {
            Ok(transactions) => (transactions, None),
            Err(e) => {
                warn!(
                    "Could not load expenses from {}: {}",
                    store.path().display(),
                    e
                );
                (Vec::new(), Some(e.to_string()))
            }
        };

        let (model, model_trained_at) = match model_store.load() {
            Ok(Some(stored)) => (Some(stored.model), Some(stored.trained_at)),
            Ok(None) => (None, None),
            Err(e) => {
                warn!(
                    "Could not load model from {}: {}",
                    model_store.path().display(),
                    e
                );
                (None, None)
            }
        };

        Self {
            store,
            model_store,
            forecaster: settings.forecaster(),
            transactions,
            model,
            model_trained_at,
            budget: settings.budget,
            currency_symbol: settings.currency_symbol.clone(),
            default_categories: settings.categories.clone(),
            load_error,
        }
    }

    /// Why the expenses file could not be read at open, if it could not
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_trained_at(&self) -> Option<DateTime<Utc>> {
        self.model_trained_at
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Set the monthly budget for this session
    pub fn set_budget(&mut self, budget: f64) -> Result<()> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(Error::InvalidData(format!(
                "Budget must be a non-negative number, got {}",
                budget
            )));
        }
        self.budget = budget;
        Ok(())
    }

    /// Configured defaults plus every category in the data, sorted
    pub fn categories(&self) -> Vec<String> {
        self.default_categories
            .iter()
            .cloned()
            .chain(self.transactions.iter().map(|t| t.category.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Record a new expense
    pub fn add(&mut self, new: NewTransaction) -> Result<CommitReport> {
        self.ensure_loaded()?;
        let tx = new.validate()?;
        info!(
            "Adding {:.2} {} on {}",
            tx.amount, tx.category, tx.date
        );
        self.transactions.push(tx);
        Ok(self.commit())
    }

    /// Edit the transaction at `row` (0-based, in date order)
    pub fn update(&mut self, row: usize, edit: TransactionEdit) -> Result<CommitReport> {
        self.ensure_loaded()?;
        let existing = self.row(row)?;
        let updated = edit.apply(existing)?;
        self.transactions[row] = updated;
        Ok(self.commit())
    }

    /// Delete the transaction at `row` (0-based, in date order)
    pub fn delete(&mut self, row: usize) -> Result<(Transaction, CommitReport)> {
        self.ensure_loaded()?;
        self.row(row)?;
        let removed = self.transactions.remove(row);
        info!(
            "Deleted {:.2} {} on {}",
            removed.amount, removed.category, removed.date
        );
        Ok((removed, self.commit()))
    }

    /// Replace the whole table, as when saving an edited grid
    ///
    /// If the stored file could not be read at open, it is moved to
    /// `<name>.bak` before the new table is written.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> Result<CommitReport> {
        let validated = transactions
            .into_iter()
            .map(|t| {
                NewTransaction {
                    date: t.date,
                    amount: t.amount,
                    category: t.category,
                    description: t.description,
                }
                .validate()
            })
            .collect::<Result<Vec<_>>>()?;
        if self.load_error.is_some() {
            self.store.backup()?;
            self.load_error = None;
        }
        self.transactions = validated;
        Ok(self.commit())
    }

    /// Replace the table with the contents of an uploaded CSV file
    ///
    /// The upload is parsed before anything is replaced, so a malformed file
    /// leaves the session untouched.
    pub fn import_csv(&mut self, path: &Path) -> Result<CommitReport> {
        if !path.exists() {
            return Err(Error::NotFound(format!("File {}", path.display())));
        }
        let file = File::open(path)?;
        let transactions = store::parse_csv(file)?;
        info!(
            "Imported {} transactions from {}",
            transactions.len(),
            path.display()
        );
        self.replace_all(transactions)
    }

    /// Sort, persist and retrain
    fn commit(&mut self) -> CommitReport {
        self.transactions.sort_by_key(|t| t.date);

        let mut warnings = Vec::new();
        if let Err(e) = self.store.save(&self.transactions) {
            warn!("Error saving to {}: {}", self.store.path().display(), e);
            warnings.push(format!("Could not save expenses: {}", e));
        }

        let (train, mut train_warnings) = self.retrain_inner();
        warnings.append(&mut train_warnings);
        CommitReport { train, warnings }
    }

    /// Retrain the model from the current transactions
    pub fn retrain(&mut self) -> Result<CommitReport> {
        self.ensure_loaded()?;
        let (train, warnings) = self.retrain_inner();
        Ok(CommitReport { train, warnings })
    }

    fn retrain_inner(&mut self) -> (TrainOutcome, Vec<String>) {
        let mut warnings = Vec::new();
        let months = distinct_months(&self.transactions);

        if months < MIN_TRAINING_MONTHS {
            info!("Not enough data to train ({} month(s))", months);
            self.clear_model(&mut warnings);
            return (TrainOutcome::NotEnoughData { months }, warnings);
        }

        let points = training_points(&aggregate_monthly(&self.transactions));
        match self.forecaster.train(&points) {
            Ok(model) => {
                if let Err(e) = self.model_store.save(&model) {
                    warn!(
                        "Error saving model to {}: {}",
                        self.model_store.path().display(),
                        e
                    );
                    warnings.push(format!("Could not save model: {}", e));
                }
                self.model = Some(model);
                self.model_trained_at = Some(Utc::now());
                (TrainOutcome::Trained { months }, warnings)
            }
            Err(e) => {
                warn!("Training failed: {}", e);
                warnings.push(format!("Training failed: {}", e));
                self.clear_model(&mut warnings);
                (TrainOutcome::Failed { months }, warnings)
            }
        }
    }

    fn clear_model(&mut self, warnings: &mut Vec<String>) {
        self.model = None;
        self.model_trained_at = None;
        if let Err(e) = self.model_store.clear() {
            warn!("Error removing stale model: {}", e);
            warnings.push(format!("Could not remove stale model: {}", e));
        }
    }

    fn ensure_loaded(&self) -> Result<()> {
        match &self.load_error {
            Some(reason) => Err(Error::UnreadableStore {
                path: self.store.path().display().to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Forecast for the month after the latest one, if a model exists
    pub fn forecast(&self, today: NaiveDate) -> Result<Option<Forecast>> {
        let Some(model) = &self.model else {
            return Ok(None);
        };
        forecast_next(
            &aggregate_monthly(&self.transactions),
            model,
            self.budget,
            &self.currency_symbol,
            today,
        )
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<Dashboard> {
        Dashboard::build(
            &self.transactions,
            self.model.as_ref(),
            self.budget,
            &self.currency_symbol,
            today,
        )
    }

    fn row(&self, row: usize) -> Result<&Transaction> {
        self.transactions.get(row).ok_or_else(|| {
            Error::NotFound(format!(
                "Row {} (have {} transactions)",
                row + 1,
                self.transactions.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{Regressor, RegressorKind};
    use crate::test_utils::{date, monthly_series, temp_settings, tx};
    use std::fs;

    fn new_expense(date_str: &str, amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            date: date(date_str),
            amount,
            category: category.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_open_empty() {
        let (_dir, settings) = temp_settings();
        let session = Session::open(&settings);
        assert!(session.transactions().is_empty());
        assert!(session.model().is_none());
        assert!(session.forecast(date("2024-01-01")).unwrap().is_none());
    }

    #[test]
    fn test_single_month_does_not_train() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);

        let report = session.add(new_expense("2024-01-05", 50.0, "Groceries")).unwrap();
        assert_eq!(report.train, TrainOutcome::NotEnoughData { months: 1 });
        assert!(report.is_clean());
        assert!(session.model().is_none());
        assert!(!settings.model_path().exists());
    }

    #[test]
    fn test_second_month_trains_and_persists() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);

        session.add(new_expense("2024-01-05", 100.0, "Groceries")).unwrap();
        let report = session.add(new_expense("2024-02-05", 200.0, "Groceries")).unwrap();

        assert!(report.train.is_trained());
        assert!(session.model().is_some());
        assert!(settings.expenses_path().exists());
        assert!(settings.model_path().exists());

        let forecast = session.forecast(date("2024-02-10")).unwrap().unwrap();
        assert_eq!(forecast.month, "2024-03");
        assert_eq!(forecast.amount, 300.0);
    }

    #[test]
    fn test_reopen_restores_state() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session
            .replace_all(monthly_series(2024, 1, &[100.0, 200.0, 300.0]))
            .unwrap();
        let before = session.forecast(date("2024-03-20")).unwrap().unwrap();

        let reopened = Session::open(&settings);
        assert_eq!(reopened.transactions().len(), 3);
        assert!(reopened.model_trained_at().is_some());
        let after = reopened.forecast(date("2024-03-20")).unwrap().unwrap();
        assert_eq!(before.amount, after.amount);
        assert_eq!(after.amount, 400.0);
    }

    #[test]
    fn test_delete_back_to_one_month_drops_model() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session
            .replace_all(monthly_series(2024, 1, &[100.0, 200.0]))
            .unwrap();
        assert!(session.model().is_some());

        let (removed, report) = session.delete(1).unwrap();
        assert_eq!(removed.amount, 200.0);
        assert_eq!(report.train, TrainOutcome::NotEnoughData { months: 1 });
        assert!(session.model().is_none());
        assert!(!settings.model_path().exists());
    }

    #[test]
    fn test_update_resorts_rows() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session
            .replace_all(vec![
                tx("2024-01-01", 10.0, "Rent"),
                tx("2024-02-01", 20.0, "Rent"),
            ])
            .unwrap();

        session
            .update(
                1,
                TransactionEdit {
                    date: Some(date("2023-12-01")),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(session.transactions()[0].amount, 20.0);
    }

    #[test]
    fn test_row_out_of_range() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        assert!(matches!(session.delete(0), Err(Error::NotFound(_))));
        assert!(matches!(
            session.update(3, TransactionEdit::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        assert!(session.add(new_expense("2024-01-01", -1.0, "Rent")).is_err());
        assert!(session.add(new_expense("2024-01-01", 1.0, "")).is_err());
        assert!(session.transactions().is_empty());
    }

    #[test]
    fn test_import_replaces_data() {
        let (dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session.add(new_expense("2020-01-01", 5.0, "Old")).unwrap();

        let upload = dir.path().join("upload.csv");
        fs::write(
            &upload,
            "Date,Amount,Category,Description\n2024-02-01,20,Rent,\n2024-01-01,10,Rent,\n",
        )
        .unwrap();

        let report = session.import_csv(&upload).unwrap();
        assert!(report.train.is_trained());
        assert_eq!(session.transactions().len(), 2);
        assert_eq!(session.transactions()[0].date, date("2024-01-01"));
    }

    #[test]
    fn test_malformed_import_leaves_session_untouched() {
        let (dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session.add(new_expense("2024-01-01", 5.0, "Rent")).unwrap();

        let upload = dir.path().join("bad.csv");
        fs::write(&upload, "Date,Amount\n2024-01-01,\n").unwrap();

        assert!(matches!(
            session.import_csv(&upload),
            Err(Error::MalformedRecord { .. })
        ));
        assert_eq!(session.transactions().len(), 1);
    }

    #[test]
    fn test_corrupt_store_degrades_to_no_data() {
        let (_dir, settings) = temp_settings();
        fs::write(settings.expenses_path(), "Date,Amount\nnot-a-date,5\n").unwrap();
        fs::write(settings.model_path(), "{ broken").unwrap();

        let session = Session::open(&settings);
        assert!(session.transactions().is_empty());
        assert!(session.model().is_none());
        assert!(session.load_error().is_some());
    }

    fn write_table_with_bad_row(settings: &Settings) -> String {
        let mut session = Session::open(settings);
        session
            .replace_all(monthly_series(2024, 1, &[100.0, 200.0, 300.0]))
            .unwrap();
        assert!(settings.model_path().exists());

        let mut raw = fs::read_to_string(settings.expenses_path()).unwrap();
        raw.push_str("2024/13/45,15,Groceries,typed by hand\n");
        fs::write(settings.expenses_path(), &raw).unwrap();
        raw
    }

    #[test]
    fn test_unreadable_store_is_never_overwritten() {
        let (_dir, settings) = temp_settings();
        let raw = write_table_with_bad_row(&settings);

        let mut session = Session::open(&settings);
        assert!(session.load_error().unwrap().contains("line 5"));

        assert!(matches!(
            session.add(new_expense("2024-04-01", 50.0, "Transport")),
            Err(Error::UnreadableStore { .. })
        ));
        assert!(matches!(
            session.update(0, TransactionEdit::default()),
            Err(Error::UnreadableStore { .. })
        ));
        assert!(matches!(
            session.delete(0),
            Err(Error::UnreadableStore { .. })
        ));
        assert!(matches!(
            session.retrain(),
            Err(Error::UnreadableStore { .. })
        ));

        assert_eq!(fs::read_to_string(settings.expenses_path()).unwrap(), raw);
        assert!(settings.model_path().exists());
        assert!(session.model().is_some());
    }

    #[test]
    fn test_import_over_unreadable_store_keeps_backup() {
        let (dir, settings) = temp_settings();
        let raw = write_table_with_bad_row(&settings);

        let upload = dir.path().join("upload.csv");
        fs::write(
            &upload,
            "Date,Amount,Category,Description\n2024-05-01,20,Rent,\n2024-06-01,30,Rent,\n",
        )
        .unwrap();

        let mut session = Session::open(&settings);
        let report = session.import_csv(&upload).unwrap();
        assert!(report.train.is_trained());
        assert!(session.load_error().is_none());

        let backup = dir.path().join("expenses.csv.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), raw);
        assert_eq!(Session::open(&settings).transactions().len(), 2);

        session.add(new_expense("2024-07-01", 5.0, "Rent")).unwrap();
    }

    #[test]
    fn test_training_failure_drops_stored_model() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session
            .replace_all(monthly_series(2024, 1, &[100.0, 200.0]))
            .unwrap();
        assert!(settings.model_path().exists());

        // Two maximal amounts in one month sum to infinity
        let report = session
            .replace_all(vec![
                tx("2024-01-01", f64::MAX, "Rent"),
                tx("2024-01-02", f64::MAX, "Rent"),
                tx("2024-02-01", 1.0, "Rent"),
            ])
            .unwrap();

        assert_eq!(report.train, TrainOutcome::Failed { months: 2 });
        assert!(!report.is_clean());
        assert!(session.model().is_none());
        assert!(!settings.model_path().exists());
        assert!(Session::open(&settings).model().is_none());
    }

    #[test]
    fn test_categories_merge_defaults_and_data() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session.add(new_expense("2024-01-01", 5.0, "Pets")).unwrap();

        let categories = session.categories();
        assert!(categories.contains(&"Pets".to_string()));
        assert!(categories.contains(&"Groceries".to_string()));
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
    }

    #[test]
    fn test_set_budget() {
        let (_dir, settings) = temp_settings();
        let mut session = Session::open(&settings);
        session.set_budget(250.0).unwrap();
        assert_eq!(session.budget(), 250.0);
        assert!(session.set_budget(-3.0).is_err());
        assert!(session.set_budget(f64::INFINITY).is_err());
    }

    #[test]
    fn test_boosted_regressor_from_settings() {
        let (_dir, mut settings) = temp_settings();
        settings.regressor = RegressorKind::Boosted;
        let mut session = Session::open(&settings);
        session
            .replace_all(monthly_series(2024, 1, &[100.0, 150.0, 120.0]))
            .unwrap();
        assert_eq!(session.model().unwrap().kind(), RegressorKind::Boosted);
    }
}
