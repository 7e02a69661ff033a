//! Ordinary least squares trend line

use serde::{Deserialize, Serialize};

use super::{Regressor, RegressorKind};
use crate::error::{Error, Result};
use crate::models::TrainingPoint;

/// `amount = intercept + slope * month_index`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    slope: f64,
    intercept: f64,
}

impl LinearTrend {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Least squares fit; needs at least two distinct month indices
    pub fn fit(points: &[TrainingPoint]) -> Result<Self> {
        let n = points.len() as f64;
        if points.is_empty() {
            return Err(Error::InsufficientData(0));
        }

        let mean_x = points.iter().map(|p| p.month_index as f64).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.amount).sum::<f64>() / n;

        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), p| {
            let dx = p.month_index as f64 - mean_x;
            (sxy + dx * (p.amount - mean_y), sxx + dx * dx)
        });

        // All x equal: the line is undefined
        if sxx == 0.0 {
            return Err(Error::InsufficientData(1));
        }

        let slope = sxy / sxx;
        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }
}

impl Regressor for LinearTrend {
    fn kind(&self) -> RegressorKind {
        RegressorKind::Linear
    }

    fn predict(&self, month_index: f64) -> f64 {
        self.intercept + self.slope * month_index
    }

    fn is_fitted(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}
