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

use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::errors::MetricError;

fn validate(predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<(), MetricError> {
    if predictions.is_empty() || actuals.is_empty() {
        return Err(MetricError::EmptyInput);
    }

    if predictions.len() != actuals.len() {
        return Err(MetricError::DimensionMismatch {
            expected: predictions.len(),
            actual: actuals.len(),
        });
    }

    if predictions.iter().any(|&v| !v.is_finite()) || actuals.iter().any(|&v| !v.is_finite()) {
        return Err(MetricError::InvalidNumericValue);
    }

    Ok(())
}

pub fn mean_squared_error(
    predictions: &Array1<f64>,
    actuals: &Array1<f64>,
) -> Result<f64, MetricError> {
    validate(predictions, actuals)?;
    let diff = predictions - actuals;
    diff.mapv(|x| x * x).mean().ok_or(MetricError::EmptyInput)
}

pub fn root_mean_squared_error(
    predictions: &Array1<f64>,
    actuals: &Array1<f64>,
) -> Result<f64, MetricError> {
    mean_squared_error(predictions, actuals).map(f64::sqrt)
}

pub fn mean_absolute_error(
    predictions: &Array1<f64>,
    actuals: &Array1<f64>,
) -> Result<f64, MetricError> {
    validate(predictions, actuals)?;
    let diff = predictions - actuals;
    diff.mapv(f64::abs).mean().ok_or(MetricError::EmptyInput)
}

/// Coefficient of determination.
///
/// With a constant `actuals` the score is 1.0 for a perfect fit and 0.0
/// otherwise, so the result is always finite.
pub fn r2_score(predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64, MetricError> {
    validate(predictions, actuals)?;
    let mean = actuals.mean().ok_or(MetricError::EmptyInput)?;
    let ss_res: f64 = predictions.iter().zip(actuals.iter()).map(|(p, a)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actuals.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Held-out error metrics of a fitted regressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub n_samples: usize,
}

impl RegressionReport {
    pub fn evaluate(
        predictions: &Array1<f64>,
        actuals: &Array1<f64>,
    ) -> Result<RegressionReport, MetricError> {
        let mse = mean_squared_error(predictions, actuals)?;
        Ok(RegressionReport {
            mse,
            rmse: mse.sqrt(),
            mae: mean_absolute_error(predictions, actuals)?,
            r2: r2_score(predictions, actuals)?,
            n_samples: actuals.len(),
        })
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} mse={:.4} rmse={:.4} mae={:.4} r2={:.4}",
            self.n_samples, self.mse, self.rmse, self.mae, self.r2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    #[test]
    fn test_mse_empty_input() {
        let predictions: Array1<f64> = Array1::zeros(0);
        let actuals = array![1.0];
        assert!(matches!(mean_squared_error(&predictions, &actuals), Err(MetricError::EmptyInput)));
    }

    #[test]
    fn test_mse_dimension_mismatch() {
        let result = mean_squared_error(&array![1.0, 2.0], &array![1.0]);
        assert!(matches!(result, Err(MetricError::DimensionMismatch { expected: 2, actual: 1 })));
    }

    #[test]
    fn test_mse_non_finite() {
        let result = mean_squared_error(&array![1.0, f64::INFINITY], &array![1.0, 2.0]);
        assert!(matches!(result, Err(MetricError::InvalidNumericValue)));
    }

    #[test]
    fn test_mse_value() {
        let mse = mean_squared_error(&array![1.0, 2.0, 3.0], &array![1.1, 2.1, 3.1]).unwrap();
        assert!((mse - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_mae_and_rmse() {
        let predictions = array![0.0, 0.0];
        let actuals = array![3.0, -4.0];
        assert_eq!(mean_absolute_error(&predictions, &actuals).unwrap(), 3.5);
        let rmse = root_mean_squared_error(&predictions, &actuals).unwrap();
        assert!((rmse - 12.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_r2_perfect_and_mean() {
        let actuals = array![1.0, 2.0, 3.0];
        assert_eq!(r2_score(&actuals.clone(), &actuals).unwrap(), 1.0);
        assert_eq!(r2_score(&array![2.0, 2.0, 2.0], &actuals).unwrap(), 0.0);
    }

    #[test]
    fn test_r2_can_be_negative() {
        let r2 = r2_score(&array![3.0, 2.0, 1.0], &array![1.0, 2.0, 3.0]).unwrap();
        assert!((r2 + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_r2_constant_actuals() {
        let actuals = array![5.0, 5.0];
        assert_eq!(r2_score(&array![5.0, 5.0], &actuals).unwrap(), 1.0);
        assert_eq!(r2_score(&array![4.0, 6.0], &actuals).unwrap(), 0.0);
    }

    #[test]
    fn test_report() {
        let report = RegressionReport::evaluate(&array![1.0, 3.0], &array![2.0, 2.0]).unwrap();
        assert_eq!(report.mse, 1.0);
        assert_eq!(report.rmse, 1.0);
        assert_eq!(report.mae, 1.0);
        assert_eq!(report.r2, 0.0);
        assert_eq!(report.n_samples, 2);
        assert_eq!(report.to_string(), "n=2 mse=1.0000 rmse=1.0000 mae=1.0000 r2=0.0000");
    }
}
