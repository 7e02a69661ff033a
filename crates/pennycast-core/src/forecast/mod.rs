//! Expense Forecaster
//!
//! Fits a regression of monthly total against month index and predicts the
//! month right after the latest one in the data.
//!
//! ## Regressors
//!
//! - **Linear Trend** - ordinary least squares line (default)
//! - **Boosted Trees** - gradient-boosted regression trees on the month index
//!
//! Every train produces a whole new [`Model`]; there is no incremental fit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pennycast_core::forecast::{Forecaster, RegressorKind};
//!
//! let forecaster = Forecaster::new(RegressorKind::Linear);
//! let model = forecaster.train(&points)?;
//! let next = Forecaster::predict_next(Some(&model), last_index)?;
//! ```

pub mod boosted;
pub mod linear;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::TrainingPoint;

pub use boosted::{BoostedTrees, BoostingParams};
pub use linear::LinearTrend;

/// Minimum number of distinct months a model can be trained on
pub const MIN_TRAINING_MONTHS: usize = 2;

/// Available regression implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressorKind {
    Linear,
    Boosted,
}

impl RegressorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Boosted => "boosted",
        }
    }
}

impl fmt::Display for RegressorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RegressorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "boosted" | "gradient_boosting" | "xgboost" => Ok(Self::Boosted),
            _ => Err(format!(
                "Unknown regressor: {} (valid: linear, boosted)",
                s
            )),
        }
    }
}

/// A fitted regression over month index
pub trait Regressor {
    /// Which implementation produced this fit
    fn kind(&self) -> RegressorKind;

    /// Evaluate the fit at a month index
    fn predict(&self, month_index: f64) -> f64;

    /// Whether the fitted state is usable for prediction
    fn is_fitted(&self) -> bool;
}

/// Opaque fitted model, serialized as a self-describing blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    Linear(LinearTrend),
    Boosted(BoostedTrees),
}

impl Model {
    fn inner(&self) -> &dyn Regressor {
        match self {
            Self::Linear(m) => m,
            Self::Boosted(m) => m,
        }
    }
}

impl Regressor for Model {
    fn kind(&self) -> RegressorKind {
        self.inner().kind()
    }

    fn predict(&self, month_index: f64) -> f64 {
        self.inner().predict(month_index)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }
}

/// Trains models and produces next-month forecasts
#[derive(Debug, Clone)]
pub struct Forecaster {
    kind: RegressorKind,
    boosting: BoostingParams,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(RegressorKind::Linear)
    }
}

impl Forecaster {
    pub fn new(kind: RegressorKind) -> Self {
        Self {
            kind,
            boosting: BoostingParams::default(),
        }
    }

    pub fn with_boosting(mut self, params: BoostingParams) -> Self {
        self.boosting = params;
        self
    }

    pub fn kind(&self) -> RegressorKind {
        self.kind
    }

    /// Fit a new model over (month_index, amount) points
    ///
    /// Fails with [`Error::InsufficientData`] when fewer than two distinct
    /// month indices are supplied.
    pub fn train(&self, points: &[TrainingPoint]) -> Result<Model> {
        let distinct: BTreeSet<i64> = points.iter().map(|p| p.month_index).collect();
        if distinct.len() < MIN_TRAINING_MONTHS {
            return Err(Error::InsufficientData(distinct.len()));
        }

        if let Some(bad) = points.iter().find(|p| !p.amount.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Non-finite amount at month index {}",
                bad.month_index
            )));
        }

        let model = match self.kind {
            RegressorKind::Linear => Model::Linear(LinearTrend::fit(points)?),
            RegressorKind::Boosted => Model::Boosted(BoostedTrees::fit(points, &self.boosting)?),
        };

        info!(
            "Trained {} model on {} points ({} months)",
            self.kind,
            points.len(),
            distinct.len()
        );
        Ok(model)
    }

    /// Predict the total for the month after `last_month_index`
    pub fn predict_next(model: Option<&Model>, last_month_index: i64) -> Result<f64> {
        let model =
            model.ok_or_else(|| Error::InvalidModel("no model has been trained".to_string()))?;
        if !model.is_fitted() {
            return Err(Error::InvalidModel(format!(
                "{} model is not fitted",
                model.kind()
            )));
        }

        let next = last_month_index + 1;
        let prediction = model.predict(next as f64);
        debug!("Predicted {:.2} for month index {}", prediction, next);
        Ok(prediction)
    }
}
