//! Settings
//!
//! ## Configuration Resolution
//!
//! Settings are loaded with a two-layer resolution:
//! 1. Check for override (explicit path, else ~/.local/share/pennycast/config/settings.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::forecast::{BoostingParams, Forecaster, RegressorKind};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/settings.toml");

/// Resolved application settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the expenses table and model
    pub data_dir: PathBuf,
    pub expenses_file: String,
    pub model_file: String,
    /// Monthly budget; zero or less disables the comparison
    pub budget: f64,
    pub currency_symbol: String,
    /// Categories offered before any data exists
    pub categories: Vec<String>,
    pub regressor: RegressorKind,
    pub boosting: BoostingParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            expenses_file: "expenses.csv".to_string(),
            model_file: "model.json".to_string(),
            budget: 10000.0,
            currency_symbol: "₹".to_string(),
            categories: [
                "Groceries",
                "Rent",
                "Transport",
                "Entertainment",
                "Utilities",
                "Other",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            regressor: RegressorKind::Linear,
            boosting: BoostingParams::default(),
        }
    }
}

impl Settings {
    /// Load settings (override first, then embedded defaults)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = if let Some(path) = override_path {
            if path.exists() {
                debug!("Reading settings from {}", path.display());
                fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            } else {
                debug!("No settings at {}, using defaults", path.display());
                DEFAULT_CONFIG.to_string()
            }
        } else {
            match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    debug!("Reading settings from {}", default_path.display());
                    fs::read_to_string(&default_path)
                        .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
                }
                _ => DEFAULT_CONFIG.to_string(),
            }
        };

        parse_settings(&content)
    }

    pub fn expenses_path(&self) -> PathBuf {
        self.data_dir.join(&self.expenses_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(&self.model_file)
    }

    /// Forecaster configured with the selected regressor
    pub fn forecaster(&self) -> Forecaster {
        Forecaster::new(self.regressor).with_boosting(self.boosting)
    }
}

/// Default settings override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pennycast").join("config").join("settings.toml"))
}

/// Default data directory, falling back to ./data when no platform dir exists
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pennycast"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    storage: Option<RawStorage>,
    budget: Option<RawBudget>,
    categories: Option<RawCategories>,
    model: Option<RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawStorage {
    data_dir: Option<PathBuf>,
    expenses_file: Option<String>,
    model_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    monthly: Option<f64>,
    currency_symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    defaults: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    regressor: Option<String>,
    n_estimators: Option<usize>,
    learning_rate: Option<f64>,
    max_depth: Option<usize>,
}

/// Parse settings from TOML content
fn parse_settings(content: &str) -> Result<Settings> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid settings TOML: {}", e)))?;

    let mut settings = Settings::default();

    if let Some(storage) = raw.storage {
        if let Some(dir) = storage.data_dir {
            settings.data_dir = dir;
        }
        if let Some(file) = storage.expenses_file {
            settings.expenses_file = file;
        }
        if let Some(file) = storage.model_file {
            settings.model_file = file;
        }
    }

    if let Some(budget) = raw.budget {
        if let Some(monthly) = budget.monthly {
            if !monthly.is_finite() || monthly < 0.0 {
                return Err(Error::Config(format!(
                    "budget.monthly must be a non-negative number, got {}",
                    monthly
                )));
            }
            settings.budget = monthly;
        }
        if let Some(symbol) = budget.currency_symbol {
            settings.currency_symbol = symbol;
        }
    }

    if let Some(categories) = raw.categories {
        if let Some(defaults) = categories.defaults {
            settings.categories = defaults
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
        }
    }

    if let Some(model) = raw.model {
        if let Some(regressor) = model.regressor {
            settings.regressor = regressor.parse().map_err(Error::Config)?;
        }
        if let Some(n) = model.n_estimators {
            settings.boosting.n_estimators = n;
        }
        if let Some(lr) = model.learning_rate {
            settings.boosting.learning_rate = lr;
        }
        if let Some(depth) = model.max_depth {
            settings.boosting.max_depth = depth;
        }
        settings
            .boosting
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;
    }

    Ok(settings)
}
