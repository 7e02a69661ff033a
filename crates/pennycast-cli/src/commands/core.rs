//! Shared command utilities
//!
//! This module contains:
//! - `GlobalOpts` - Options that apply to every command
//! - `load_settings` / `open_session` - Resolve settings and open the data
//! - `print_commit` - Report the outcome of a save + retrain cycle

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennycast_core::{CommitReport, Session, Settings, TrainOutcome};
use tracing::debug;

/// Options shared by all commands
#[derive(Debug, Default, Clone)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub budget: Option<f64>,
}

/// Resolve settings, applying command-line overrides
pub fn load_settings(opts: &GlobalOpts) -> Result<Settings> {
    let mut settings =
        Settings::load(opts.config.as_deref()).context("Failed to load settings")?;
    if let Some(dir) = &opts.data_dir {
        settings.data_dir = dir.clone();
    }
    Ok(settings)
}

/// Open a session over the resolved data directory
pub fn open_session(opts: &GlobalOpts) -> Result<Session> {
    let settings = load_settings(opts)?;
    debug!(
        "Opening session in {} ({} regressor)",
        settings.data_dir.display(),
        settings.regressor
    );
    let mut session = Session::open(&settings);
    if let Some(budget) = opts.budget {
        session
            .set_budget(budget)
            .context("Invalid --budget value")?;
    }
    Ok(session)
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Convert a 1-based row number from the listing into a 0-based index
pub fn row_index(row: usize) -> Result<usize> {
    row.checked_sub(1)
        .context("Row numbers start at 1 (see `pennycast list`)")
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Print the retrain outcome and any save or training warnings
pub fn print_commit(report: &CommitReport) {
    match report.train {
        TrainOutcome::Trained { months } => {
            println!("   📈 Model retrained on {} months", months);
        }
        TrainOutcome::NotEnoughData { months } => {
            println!(
                "   ℹ️  Not enough data to forecast yet ({} month{} of data, need 2)",
                months,
                if months == 1 { "" } else { "s" }
            );
        }
        TrainOutcome::Failed { months } => {
            println!(
                "   ❌ Training failed on {} months; the previous model was removed",
                months
            );
        }
    }
    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }
}
