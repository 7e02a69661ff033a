//! Gradient-boosted regression trees over the month index
//!
//! Squared-error boosting: start from the mean, then repeatedly fit a small
//! tree to the residuals and add a shrunken copy of it. With a single feature
//! every split is a threshold on month index, so trees are built by scanning
//! the sorted points once per node.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Regressor, RegressorKind};
use crate::error::{Error, Result};
use crate::models::TrainingPoint;

/// Boosting hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::InvalidData(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidData(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        /// Points with `x < threshold` go left
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn eval(&self, x: f64) -> f64 {
        match self {
            Self::Leaf { value } => *value,
            Self::Split {
                threshold,
                left,
                right,
            } => {
                if x < *threshold {
                    left.eval(x)
                } else {
                    right.eval(x)
                }
            }
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Self::Leaf { value } => value.is_finite(),
            Self::Split {
                threshold,
                left,
                right,
            } => threshold.is_finite() && left.is_finite() && right.is_finite(),
        }
    }

    /// Build a tree over `samples` of (x, residual), sorted by x
    fn build(samples: &[(f64, f64)], depth: usize) -> Self {
        let n = samples.len();
        let sum: f64 = samples.iter().map(|s| s.1).sum();
        let leaf = Self::Leaf {
            value: sum / n as f64,
        };

        if depth == 0 || n < 2 {
            return leaf;
        }

        let sum_sq: f64 = samples.iter().map(|s| s.1 * s.1).sum();
        let parent_sse = sum_sq - sum * sum / n as f64;

        // Prefix scan: candidate split between every pair of distinct x values
        let mut best: Option<(usize, f64)> = None;
        let (mut left_sum, mut left_sq) = (0.0, 0.0);
        for i in 1..n {
            let (_, r) = samples[i - 1];
            left_sum += r;
            left_sq += r * r;
            if samples[i].0 == samples[i - 1].0 {
                continue;
            }

            let left_n = i as f64;
            let right_n = (n - i) as f64;
            let right_sum = sum - left_sum;
            let right_sq = sum_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.map_or(true, |(_, best_sse)| sse < best_sse) {
                best = Some((i, sse));
            }
        }

        match best {
            Some((i, sse)) if sse < parent_sse => {
                let threshold = (samples[i - 1].0 + samples[i].0) / 2.0;
                Self::Split {
                    threshold,
                    left: Box::new(Self::build(&samples[..i], depth - 1)),
                    right: Box::new(Self::build(&samples[i..], depth - 1)),
                }
            }
            _ => leaf,
        }
    }
}

/// Additive ensemble of shallow regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTrees {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<TreeNode>,
}

impl BoostedTrees {
    pub fn fit(points: &[TrainingPoint], params: &BoostingParams) -> Result<Self> {
        params.validate()?;
        if points.is_empty() {
            return Err(Error::InsufficientData(0));
        }

        let mut samples: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (p.month_index as f64, p.amount))
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let base_score = samples.iter().map(|s| s.1).sum::<f64>() / samples.len() as f64;
        let mut predictions = vec![base_score; samples.len()];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let residuals: Vec<(f64, f64)> = samples
                .iter()
                .zip(&predictions)
                .map(|(&(x, y), &pred)| (x, y - pred))
                .collect();

            let tree = TreeNode::build(&residuals, params.max_depth);
            for (pred, &(x, _)) in predictions.iter_mut().zip(&samples) {
                *pred += params.learning_rate * tree.eval(x);
            }
            trees.push(tree);
        }

        debug!(
            "Boosted {} trees (depth {}, lr {}) over {} points",
            trees.len(),
            params.max_depth,
            params.learning_rate,
            samples.len()
        );

        Ok(Self {
            base_score,
            learning_rate: params.learning_rate,
            trees,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for BoostedTrees {
    fn kind(&self) -> RegressorKind {
        RegressorKind::Boosted
    }

    fn predict(&self, month_index: f64) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| {
                acc + self.learning_rate * tree.eval(month_index)
            })
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
            && self.base_score.is_finite()
            && self.learning_rate.is_finite()
            && self.trees.iter().all(TreeNode::is_finite)
    }
}
