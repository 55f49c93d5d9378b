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

//! End-to-end training run: clean, split, fit, evaluate, persist.

use log::{debug, info};

use crate::artifact::ModelArtifact;
use crate::boosting::GradientBoostingRegressor;
use crate::config::PipelineConfig;
use crate::data::{fetch_records, RecordProvider};
use crate::dataset::clean;
use crate::errors::PipelineError;
use crate::metrics::RegressionReport;
use crate::record::RawRecord;
use crate::split::train_test_split;

/// Everything a training run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub artifact: ModelArtifact,
    /// Metrics on the held-out partition.
    pub report: RegressionReport,
    pub train_size: usize,
    pub test_size: usize,
    /// Records discarded during cleaning.
    pub dropped: usize,
    /// Prediction for `config.demo_input`.
    pub demo_prediction: f64,
}

/// Trains and evaluates a model on `records` without touching the filesystem.
pub fn run(
    records: Vec<RawRecord>,
    config: &PipelineConfig,
) -> Result<PipelineResult, PipelineError> {
    config.validate()?;
    let cleaned = clean(records)?;
    let dataset = cleaned.dataset;
    info!("Cleaned dataset has {} records ({} dropped)", dataset.len(), cleaned.dropped);

    let (train, test) = train_test_split(&dataset, config.test_ratio, config.random_state)?;
    debug!("Split into {} train / {} test records", train.len(), test.len());

    let x_train = train.features(&config.features);
    let y_train = train.targets(config.target);
    let x_test = test.features(&config.features);
    let y_test = test.targets(config.target);

    let mut model = GradientBoostingRegressor::new().params(config.hyperparameters.clone()).build();
    info!(
        "Training {} on [{}] -> {}",
        config.hyperparameters.objective.name(),
        config.features.names().join(", "),
        config.target
    );
    model.fit(&x_train, &y_train)?;

    let predictions = model.predict(&x_test)?;
    let report = RegressionReport::evaluate(&predictions, &y_test)?;
    info!("Held-out evaluation: {}", report);

    if let Some(min_r2) = config.min_r2 {
        if report.r2 < min_r2 {
            return Err(PipelineError::BelowThreshold { r2: report.r2, min_r2 });
        }
    }

    let artifact = ModelArtifact::new(config.features.clone(), config.target, model);
    let demo_prediction = artifact.predict_one(&config.demo_input)?;

    Ok(PipelineResult {
        artifact,
        report,
        train_size: train.len(),
        test_size: test.len(),
        dropped: cleaned.dropped,
        demo_prediction,
    })
}

/// Fetches records from `provider`, runs the pipeline and saves the model to
/// `config.model_out`. Nothing is written when any earlier stage fails.
pub fn execute(
    provider: &dyn RecordProvider,
    config: &PipelineConfig,
) -> Result<PipelineResult, PipelineError> {
    let records = fetch_records(provider)?;
    let result = run(records, config)?;
    result.artifact.save(&config.model_out)?;
    Ok(result)
}
