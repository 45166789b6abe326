//! Gradient-boosted regression trees
//!
//! A small exact-greedy booster for tabular features with the squared-error
//! objective. Each round fits a tree to the gradients of the current ensemble
//! using second-order split gains with L2 regularisation on leaf weights.
//!
//! Missing feature values are encoded as `NaN`. Every split learns a default
//! direction for them; when training data has no missing values at a split,
//! they follow the child that received more training weight.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Hyper-parameters for [`GradientBoostedRegressor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to every tree's contribution
    pub learning_rate: f64,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// L2 regularisation on leaf weights
    pub lambda: f64,
    /// Minimum hessian sum per child
    pub min_child_weight: f64,
    /// Minimum gain required to split
    pub gamma: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            lambda: 1.0,
            min_child_weight: 1.0,
            gamma: 0.0,
        }
    }
}

impl BoostingParams {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(MathError::InvalidInput(
                "Number of estimators must be greater than zero".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(MathError::InvalidInput(format!(
                "Learning rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(MathError::InvalidInput(
                "Maximum depth must be greater than zero".to_string(),
            ));
        }
        if self.lambda < 0.0 || self.min_child_weight < 0.0 || self.gamma < 0.0 {
            return Err(MathError::InvalidInput(
                "Regularisation terms must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        missing_left: bool,
        left: usize,
        right: usize,
    },
}

/// A single regression tree stored as a node arena
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Predict the (already shrunk) contribution of this tree for one row
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    missing_left,
                    left,
                    right,
                } => {
                    let x = row[*feature];
                    let go_left = if x.is_nan() { *missing_left } else { x < *threshold };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }

    /// Number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    missing_left: bool,
    gain: f64,
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a BoostingParams,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.params.lambda)
    }

    fn leaf_value(&self, g: f64, h: f64) -> f64 {
        -g / (h + self.params.lambda) * self.params.learning_rate
    }

    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let g: f64 = rows.iter().map(|&i| self.grad[i]).sum();
        let h: f64 = rows.iter().map(|&i| self.hess[i]).sum();

        let split = if depth < self.params.max_depth && rows.len() > 1 {
            self.best_split(&rows, g, h)
        } else {
            None
        };

        let Some(split) = split else {
            self.nodes.push(Node::Leaf {
                value: self.leaf_value(g, h),
            });
            return self.nodes.len() - 1;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows.into_iter().partition(|&i| {
            let v = self.x[i][split.feature];
            if v.is_nan() {
                split.missing_left
            } else {
                v < split.threshold
            }
        });

        // Reserve the slot so children land after their parent
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: 0.0 });
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            missing_left: split.missing_left,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let n_features = self.x[rows[0]].len();
        let parent = self.score(g, h);
        let min_child = self.params.min_child_weight;
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..n_features {
            let mut present: Vec<(f64, f64, f64)> = Vec::with_capacity(rows.len());
            let (mut g_missing, mut h_missing) = (0.0, 0.0);
            for &i in rows {
                let v = self.x[i][feature];
                if v.is_nan() {
                    g_missing += self.grad[i];
                    h_missing += self.hess[i];
                } else {
                    present.push((v, self.grad[i], self.hess[i]));
                }
            }
            if present.len() < 2 {
                continue;
            }
            present.sort_by(|a, b| a.0.total_cmp(&b.0));

            let g_present = g - g_missing;
            let h_present = h - h_missing;
            let (mut g_left, mut h_left) = (0.0, 0.0);

            for k in 0..present.len() - 1 {
                g_left += present[k].1;
                h_left += present[k].2;
                if present[k].0 == present[k + 1].0 {
                    continue;
                }
                let g_right = g_present - g_left;
                let h_right = h_present - h_left;

                let mut options = [
                    (true, g_left + g_missing, h_left + h_missing, g_right, h_right),
                    (false, g_left, h_left, g_right + g_missing, h_right + h_missing),
                ];
                if h_missing == 0.0 && h_right > h_left {
                    options.swap(0, 1);
                }

                for (missing_left, gl, hl, gr, hr) in options {
                    if hl < min_child || hr < min_child {
                        continue;
                    }
                    let gain =
                        0.5 * (self.score(gl, hl) + self.score(gr, hr) - parent) - self.params.gamma;
                    let better = match &best {
                        Some(b) => gain > b.gain,
                        None => gain > 1e-12,
                    };
                    if better {
                        best = Some(SplitCandidate {
                            feature,
                            threshold: 0.5 * (present[k].0 + present[k + 1].0),
                            missing_left,
                            gain,
                        });
                    }
                }
            }
        }

        best
    }
}

/// Gradient-boosted ensemble of regression trees
#[derive(Debug, Clone)]
pub struct GradientBoostedRegressor {
    params: BoostingParams,
    base_score: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    /// Create an unfitted regressor
    pub fn new(params: BoostingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            base_score: 0.0,
            n_features: 0,
            trees: Vec::new(),
        })
    }

    /// Hyper-parameters in use
    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    /// Fitted trees
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Fit the ensemble on a feature matrix (rows) and target vector
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if x.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a booster on an empty training set".to_string(),
            ));
        }
        if x.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "Feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(MathError::InvalidInput(
                "Every feature row must have the same non-zero width".to_string(),
            ));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Training targets must be finite".to_string(),
            ));
        }

        self.n_features = n_features;
        self.base_score = crate::mean(y).unwrap_or(0.0);
        self.trees.clear();

        let mut predictions = vec![self.base_score; y.len()];
        let hess = vec![1.0; y.len()];

        for _ in 0..self.params.n_estimators {
            let grad: Vec<f64> = predictions.iter().zip(y).map(|(p, t)| p - t).collect();

            let mut builder = TreeBuilder {
                x,
                grad: &grad,
                hess: &hess,
                params: &self.params,
                nodes: Vec::new(),
            };
            builder.build((0..y.len()).collect(), 0);
            let tree = RegressionTree {
                nodes: builder.nodes,
            };

            for (p, row) in predictions.iter_mut().zip(x) {
                *p += tree.predict_row(row);
            }
            self.trees.push(tree);
        }

        Ok(())
    }

    /// Predict a single row
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>()
    }

    /// Predict every row of a feature matrix
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MathError::CalculationError(
                "Booster has not been fitted".to_string(),
            ));
        }
        if let Some(row) = x.iter().find(|row| row.len() != self.n_features) {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features per row, got {}",
                self.n_features,
                row.len()
            )));
        }

        Ok(x.iter().map(|row| self.predict_row(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 10.0 } else { 50.0 }).collect();
        (x, y)
    }

    #[test]
    fn learns_a_step_function() {
        let (x, y) = step_data();
        let mut model = GradientBoostedRegressor::new(BoostingParams::default()).unwrap();
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        for (p, t) in preds.iter().zip(&y) {
            assert_abs_diff_eq!(*p, *t, epsilon = 0.5);
        }
        assert_eq!(model.trees().len(), 100);
    }

    #[test]
    fn constant_target_yields_constant_prediction() {
        let x: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let y = vec![1000.0; 12];
        let mut model = GradientBoostedRegressor::new(BoostingParams::default()).unwrap();
        model.fit(&x, &y).unwrap();

        assert!(model.trees().iter().all(|t| t.leaf_count() == 1));
        assert_abs_diff_eq!(model.predict_row(&[99.0, 1.0]), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_values_follow_the_heavier_child() {
        // 15 low rows and 5 high rows: missing values should land with the low group
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 15 { 0.0 } else { 100.0 }).collect();
        let params = BoostingParams {
            max_depth: 1,
            ..BoostingParams::default()
        };
        let mut model = GradientBoostedRegressor::new(params).unwrap();
        model.fit(&x, &y).unwrap();

        let missing = model.predict_row(&[f64::NAN]);
        let low = model.predict_row(&[0.0]);
        assert_abs_diff_eq!(missing, low, epsilon = 1e-9);
    }

    #[test]
    fn rejects_malformed_training_data() {
        let mut model = GradientBoostedRegressor::new(BoostingParams::default()).unwrap();
        assert!(model.fit(&[], &[]).is_err());
        assert!(model.fit(&[vec![1.0], vec![2.0]], &[1.0]).is_err());
        assert!(model.fit(&[vec![1.0], vec![2.0, 3.0]], &[1.0, 2.0]).is_err());
        assert!(model.fit(&[vec![1.0]], &[f64::NAN]).is_err());
        assert!(model.predict(&[vec![1.0]]).is_err());
    }

    #[test]
    fn validates_parameters() {
        let bad = BoostingParams {
            learning_rate: 0.0,
            ..BoostingParams::default()
        };
        assert!(GradientBoostedRegressor::new(bad).is_err());

        let bad = BoostingParams {
            n_estimators: 0,
            ..BoostingParams::default()
        };
        assert!(bad.validate().is_err());
    }
}
