// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use log::{debug, info, trace};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::objective::Objective;
use crate::tree::{RegressionTree, TreeParams};

/// Hyperparameters of [`GradientBoostingRegressor`].
///
/// Defaults are the fixed settings of the throughput model; the regularization
/// terms default to the values XGBoost uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub seed: u64,
    pub objective: Objective,
    pub reg_lambda: f64,
    pub gamma: f64,
    pub min_child_weight: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        BoostingParams {
            n_estimators: 250,
            learning_rate: 0.08,
            max_depth: 6,
            subsample: 0.9,
            colsample_bytree: 0.9,
            seed: 42,
            objective: Objective::SquaredError,
            reg_lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::InvalidParameter(msg));

        if self.n_estimators == 0 {
            return invalid("n_estimators must be at least 1".to_string());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1".to_string());
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid(format!("subsample must be in (0, 1], got {}", self.subsample));
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return invalid(format!(
                "colsample_bytree must be in (0, 1], got {}",
                self.colsample_bytree
            ));
        }
        if !(self.reg_lambda.is_finite() && self.reg_lambda >= 0.0) {
            return invalid(format!("reg_lambda must be non-negative, got {}", self.reg_lambda));
        }
        if !(self.gamma.is_finite() && self.gamma >= 0.0) {
            return invalid(format!("gamma must be non-negative, got {}", self.gamma));
        }
        if !(self.min_child_weight.is_finite() && self.min_child_weight >= 0.0) {
            return invalid(format!(
                "min_child_weight must be non-negative, got {}",
                self.min_child_weight
            ));
        }
        self.objective.validate().map_err(ModelError::InvalidParameter)
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            reg_lambda: self.reg_lambda,
            gamma: self.gamma,
            min_child_weight: self.min_child_weight,
        }
    }
}

pub struct GradientBoostingBuilder {
    params: BoostingParams,
}

impl GradientBoostingBuilder {
    pub fn params(mut self, params: BoostingParams) -> Self {
        self.params = params;
        self
    }

    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.params.n_estimators = n_estimators;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.params.learning_rate = learning_rate;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.params.max_depth = max_depth;
        self
    }

    pub fn subsample(mut self, subsample: f64) -> Self {
        self.params.subsample = subsample;
        self
    }

    pub fn colsample_bytree(mut self, colsample_bytree: f64) -> Self {
        self.params.colsample_bytree = colsample_bytree;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    pub fn objective(mut self, objective: Objective) -> Self {
        self.params.objective = objective;
        self
    }

    pub fn reg_lambda(mut self, reg_lambda: f64) -> Self {
        self.params.reg_lambda = reg_lambda;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.params.gamma = gamma;
        self
    }

    pub fn min_child_weight(mut self, min_child_weight: f64) -> Self {
        self.params.min_child_weight = min_child_weight;
        self
    }

    pub fn build(self) -> GradientBoostingRegressor {
        GradientBoostingRegressor {
            params: self.params,
            base_score: 0.0,
            n_features: None,
            trees: Vec::new(),
        }
    }
}

/// Gradient-boosted regression tree ensemble.
///
/// Each boosting round fits one [`RegressionTree`] to the gradient and
/// hessian of the objective at the current predictions, on a random row
/// subsample and a random subset of columns. The tree's leaf weights are
/// shrunk by the learning rate before being added to the ensemble. All
/// randomness is drawn from a single generator seeded with
/// [`BoostingParams::seed`], so fitting the same data twice yields the same
/// model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    params: BoostingParams,
    base_score: f64,
    n_features: Option<usize>,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    pub fn new() -> GradientBoostingBuilder {
        GradientBoostingBuilder { params: BoostingParams::default() }
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        self.params.validate()?;
        if x.nrows() == 0 || y.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        if x.ncols() == 0 {
            return Err(ModelError::NoFeatures);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch { expected: x.nrows(), actual: y.len() });
        }
        if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidNumericValue);
        }

        let (n_samples, n_features) = x.dim();
        let objective = self.params.objective;
        let tree_params = self.params.tree_params();
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        self.base_score = y.mean().ok_or(ModelError::EmptyInput)?;
        self.trees = Vec::with_capacity(self.params.n_estimators);

        let mut predictions = Array1::from_elem(n_samples, self.base_score);
        let mut grad = Array1::zeros(n_samples);
        let mut hess = Array1::zeros(n_samples);

        debug!(
            "Fitting {} rounds on {} samples x {} features, base score {:.6}",
            self.params.n_estimators, n_samples, n_features, self.base_score
        );

        for round in 0..self.params.n_estimators {
            objective.gradients(&predictions, y, &mut grad, &mut hess);

            let rows = sample_rows(n_samples, self.params.subsample, &mut rng);
            let columns = sample_columns(n_features, self.params.colsample_bytree, &mut rng);

            let mut tree = RegressionTree::grow(x, &grad, &hess, rows, &columns, &tree_params);
            tree.shrink(self.params.learning_rate);

            for (p, row) in predictions.iter_mut().zip(x.axis_iter(Axis(0))) {
                *p += tree.predict_row(row);
            }
            self.trees.push(tree);

            trace!(
                "round {}: train {} = {:.6}",
                round,
                objective.name(),
                objective.loss(&predictions, y)
            );
        }

        self.n_features = Some(n_features);
        info!(
            "Fitted {} trees, final train {} = {:.6}",
            self.trees.len(),
            objective.name(),
            objective.loss(&predictions, y)
        );
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let n_features = self.n_features.ok_or(ModelError::NotFitted)?;
        if x.ncols() != n_features {
            return Err(ModelError::DimensionMismatch { expected: n_features, actual: x.ncols() });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidNumericValue);
        }

        Ok(x.axis_iter(Axis(0))
            .map(|row| self.base_score + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>())
            .collect())
    }

    /// Total split gain per feature, normalized to sum to one.
    ///
    /// All zeros when no tree ever split.
    pub fn feature_importances(&self) -> Result<Array1<f64>, ModelError> {
        let n_features = self.n_features.ok_or(ModelError::NotFitted)?;
        let mut totals = vec![0.0; n_features];
        for tree in &self.trees {
            tree.accumulate_gain(&mut totals);
        }
        let sum: f64 = totals.iter().sum();
        let importances = Array1::from_vec(totals);
        Ok(if sum > 0.0 { importances / sum } else { importances })
    }
}

// Bernoulli row sampling; never returns an empty sample.
fn sample_rows(n_samples: usize, subsample: f64, rng: &mut StdRng) -> Vec<usize> {
    if subsample >= 1.0 {
        return (0..n_samples).collect();
    }
    let rows: Vec<usize> = (0..n_samples).filter(|_| rng.gen_bool(subsample)).collect();
    if rows.is_empty() { vec![rng.gen_range(0..n_samples)] } else { rows }
}

fn sample_columns(n_features: usize, colsample: f64, rng: &mut StdRng) -> Vec<usize> {
    if colsample >= 1.0 {
        return (0..n_features).collect();
    }
    let amount = ((n_features as f64 * colsample).floor() as usize).clamp(1, n_features);
    let mut columns = index::sample(rng, n_features, amount).into_vec();
    columns.sort_unstable();
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| {
            if j == 0 { i as f64 } else { (i % 7) as f64 }
        });
        let y = x.column(0).mapv(|v| if v < 20.0 { 5.0 } else { 50.0 });
        (x, y)
    }

    #[test]
    fn test_default_params() {
        let params = BoostingParams::default();
        assert_eq!(params.n_estimators, 250);
        assert_eq!(params.learning_rate, 0.08);
        assert_eq!(params.max_depth, 6);
        assert_eq!(params.subsample, 0.9);
        assert_eq!(params.colsample_bytree, 0.9);
        assert_eq!(params.seed, 42);
        assert_eq!(params.objective, Objective::SquaredError);
    }

    #[test]
    fn test_fit_predict_step_function() {
        let (x, y) = step_data();
        let mut model = GradientBoostingRegressor::new().build();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.trees().len(), 250);
        let predictions = model.predict(&array![[3.0, 3.0], [35.0, 0.0]]).unwrap();
        assert!((predictions[0] - 5.0).abs() < 1.0, "got {}", predictions[0]);
        assert!((predictions[1] - 50.0).abs() < 1.0, "got {}", predictions[1]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = step_data();
        let mut a = GradientBoostingRegressor::new().n_estimators(30).build();
        let mut b = GradientBoostingRegressor::new().n_estimators(30).build();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predictions_are_finite() {
        let (x, y) = step_data();
        let mut model = GradientBoostingRegressor::new()
            .n_estimators(20)
            .objective(Objective::PseudoHuber { slope: 1.0 })
            .build();
        model.fit(&x, &y).unwrap();
        assert!(model.predict(&x).unwrap().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_base_score_is_target_mean() {
        let x = array![[1.0], [2.0]];
        let y = array![2.0, 4.0];
        let mut model = GradientBoostingRegressor::new().n_estimators(1).build();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.base_score(), 3.0);
    }

    #[test]
    fn test_single_row_fit() {
        let x = array![[1.0, 2.0, 3.0]];
        let y = array![7.0];
        let mut model = GradientBoostingRegressor::new().n_estimators(5).build();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap()[0], 7.0);
    }

    #[test]
    fn test_fit_empty_input() {
        let mut model = GradientBoostingRegressor::new().build();
        let x: Array2<f64> = Array2::zeros((0, 3));
        let y: Array1<f64> = Array1::zeros(0);
        assert!(matches!(model.fit(&x, &y), Err(ModelError::EmptyInput)));
    }

    #[test]
    fn test_fit_no_features() {
        let mut model = GradientBoostingRegressor::new().build();
        let x: Array2<f64> = Array2::zeros((2, 0));
        let y = array![1.0, 2.0];
        assert!(matches!(model.fit(&x, &y), Err(ModelError::NoFeatures)));
    }

    #[test]
    fn test_fit_dimension_mismatch() {
        let mut model = GradientBoostingRegressor::new().build();
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            model.fit(&x, &y),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_fit_non_finite() {
        let mut model = GradientBoostingRegressor::new().build();
        let x = array![[1.0], [f64::NAN]];
        let y = array![1.0, 2.0];
        assert!(matches!(model.fit(&x, &y), Err(ModelError::InvalidNumericValue)));
    }

    #[test]
    fn test_fit_invalid_parameters() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let builders = vec![
            GradientBoostingRegressor::new().n_estimators(0),
            GradientBoostingRegressor::new().learning_rate(0.0),
            GradientBoostingRegressor::new().max_depth(0),
            GradientBoostingRegressor::new().subsample(1.5),
            GradientBoostingRegressor::new().colsample_bytree(0.0),
            GradientBoostingRegressor::new().reg_lambda(-1.0),
            GradientBoostingRegressor::new().objective(Objective::PseudoHuber { slope: -1.0 }),
        ];
        for builder in builders {
            let mut model = builder.build();
            assert!(matches!(model.fit(&x, &y), Err(ModelError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_predict_not_fitted() {
        let model = GradientBoostingRegressor::new().build();
        assert!(matches!(model.predict(&array![[1.0]]), Err(ModelError::NotFitted)));
        assert!(matches!(model.feature_importances(), Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let mut model = GradientBoostingRegressor::new().n_estimators(2).build();
        model.fit(&array![[1.0, 2.0], [3.0, 4.0]], &array![1.0, 2.0]).unwrap();
        assert!(matches!(
            model.predict(&array![[1.0, 2.0, 3.0]]),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_feature_importances() {
        let (x, y) = step_data();
        let mut model =
            GradientBoostingRegressor::new().n_estimators(20).colsample_bytree(1.0).build();
        model.fit(&x, &y).unwrap();

        let importances = model.feature_importances().unwrap();
        assert!((importances.sum() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_sample_rows_and_columns() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(sample_rows(5, 1.0, &mut rng), vec![0, 1, 2, 3, 4]);
        assert_eq!(sample_rows(1, 0.01, &mut rng).len(), 1);

        let columns = sample_columns(3, 0.9, &mut rng);
        assert_eq!(columns.len(), 2);
        assert!(columns.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sample_columns(3, 0.1, &mut rng).len(), 1);
    }
}
