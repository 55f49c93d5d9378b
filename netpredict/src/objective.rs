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

use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

/// Training objective of the boosted ensemble.
///
/// Each objective supplies the first and second derivative of its loss with
/// respect to the raw prediction; trees are grown on those statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Objective {
    /// `½ (p − y)²`
    #[default]
    SquaredError,
    /// `δ² (√(1 + ((p − y)/δ)²) − 1)`, quadratic near zero and linear in the tails.
    PseudoHuber { slope: f64 },
}

impl Objective {
    pub fn name(&self) -> &'static str {
        match self {
            Objective::SquaredError => "reg:squarederror",
            Objective::PseudoHuber { .. } => "reg:pseudohubererror",
        }
    }

    /// Gradient and hessian of the loss at `prediction` for label `label`.
    pub fn gradient(&self, prediction: f64, label: f64) -> (f64, f64) {
        let z = prediction - label;
        match *self {
            Objective::SquaredError => (z, 1.0),
            Objective::PseudoHuber { slope } => {
                let scale = 1.0 + (z / slope).powi(2);
                let scale_sqrt = scale.sqrt();
                (z / scale_sqrt, 1.0 / (scale * scale_sqrt))
            }
        }
    }

    /// Fills `grad` and `hess` for every row.
    pub fn gradients(
        &self,
        predictions: &Array1<f64>,
        labels: &Array1<f64>,
        grad: &mut Array1<f64>,
        hess: &mut Array1<f64>,
    ) {
        Zip::from(grad).and(hess).and(predictions).and(labels).for_each(|g, h, &p, &y| {
            let (gi, hi) = self.gradient(p, y);
            *g = gi;
            *h = hi;
        });
    }

    /// Mean loss over all rows.
    pub fn loss(&self, predictions: &Array1<f64>, labels: &Array1<f64>) -> f64 {
        let n = predictions.len().max(1) as f64;
        let total: f64 = predictions
            .iter()
            .zip(labels.iter())
            .map(|(&p, &y)| {
                let z = p - y;
                match *self {
                    Objective::SquaredError => 0.5 * z * z,
                    Objective::PseudoHuber { slope } => {
                        slope * slope * ((1.0 + (z / slope).powi(2)).sqrt() - 1.0)
                    }
                }
            })
            .sum();
        total / n
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match *self {
            Objective::SquaredError => Ok(()),
            Objective::PseudoHuber { slope } if slope.is_finite() && slope > 0.0 => Ok(()),
            Objective::PseudoHuber { slope } => {
                Err(format!("pseudo-Huber slope must be positive, got {slope}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_default_is_squared_error() {
        assert_eq!(Objective::default(), Objective::SquaredError);
    }

    #[test]
    fn test_squared_error_gradient() {
        let (g, h) = Objective::SquaredError.gradient(3.0, 1.0);
        assert_eq!(g, 2.0);
        assert_eq!(h, 1.0);
    }

    #[test]
    fn test_pseudo_huber_gradient_is_bounded() {
        let objective = Objective::PseudoHuber { slope: 1.0 };
        let (g, h) = objective.gradient(1000.0, 0.0);
        assert!(g < 1.0 && g > 0.99);
        assert!(h > 0.0 && h < 1e-6);

        let (g, h) = objective.gradient(0.0, 0.0);
        assert_eq!(g, 0.0);
        assert_eq!(h, 1.0);
    }

    #[test]
    fn test_gradients_fill_arrays() {
        let predictions = array![1.0, 2.0, 3.0];
        let labels = array![1.0, 1.0, 1.0];
        let mut grad = Array1::zeros(3);
        let mut hess = Array1::zeros(3);
        Objective::SquaredError.gradients(&predictions, &labels, &mut grad, &mut hess);
        assert_eq!(grad, array![0.0, 1.0, 2.0]);
        assert_eq!(hess, array![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_loss() {
        let predictions = array![1.0, 3.0];
        let labels = array![1.0, 1.0];
        assert!((Objective::SquaredError.loss(&predictions, &labels) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(Objective::SquaredError.validate().is_ok());
        assert!(Objective::PseudoHuber { slope: 0.0 }.validate().is_err());
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&Objective::PseudoHuber { slope: 2.0 }).unwrap();
        assert_eq!(json, r#"{"kind":"pseudo_huber","slope":2.0}"#);
        let parsed: Objective = serde_json::from_str(r#"{"kind":"squared_error"}"#).unwrap();
        assert_eq!(parsed, Objective::SquaredError);
    }
}
