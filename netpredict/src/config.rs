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

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::boosting::BoostingParams;
use crate::errors::ConfigError;
use crate::record::{FeatureSpec, FeatureVector, Target};

pub const DEFAULT_CSV_PATH: &str = "network_logs_test.csv";
pub const DEFAULT_MODEL_OUT: &str = "xgb_signal_strength_model.json";
pub const DEFAULT_RANDOM_STATE: u64 = 42;
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Every knob of a training run.
///
/// `random_state` seeds the train/test split; the model draws its own
/// randomness from `hyperparameters.seed`. [`with_random_state`] sets both.
///
/// [`with_random_state`]: PipelineConfig::with_random_state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub csv_path: PathBuf,
    pub model_out: PathBuf,
    pub random_state: u64,
    pub target: Target,
    pub test_ratio: f64,
    pub features: FeatureSpec,
    pub hyperparameters: BoostingParams,
    /// When set, runs scoring a lower held-out R² are rejected before saving.
    pub min_r2: Option<f64>,
    pub demo_input: FeatureVector,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            model_out: PathBuf::from(DEFAULT_MODEL_OUT),
            random_state: DEFAULT_RANDOM_STATE,
            target: Target::DownloadMbps,
            test_ratio: DEFAULT_TEST_RATIO,
            features: FeatureSpec::default(),
            hyperparameters: BoostingParams::default(),
            min_r2: None,
            demo_input: FeatureVector::DEMO,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        PipelineConfig::default()
    }

    /// Loads a config from a JSON document; absent keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rejects settings that would let a run pass checks it should fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.min_r2 {
            Some(min_r2) if !min_r2.is_finite() => {
                Err(ConfigError::InvalidValue(format!("min_r2 must be finite, got {}", min_r2)))
            }
            _ => Ok(()),
        }
    }

    pub fn with_csv_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.csv_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_model_out<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.model_out = path.as_ref().to_path_buf();
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self.hyperparameters.seed = seed;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_test_ratio(mut self, ratio: f64) -> Self {
        self.test_ratio = ratio;
        self
    }

    pub fn with_features(mut self, features: FeatureSpec) -> Self {
        self.features = features;
        self
    }

    pub fn with_hyperparameters(mut self, hyperparameters: BoostingParams) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    pub fn with_min_r2(mut self, min_r2: Option<f64>) -> Self {
        self.min_r2 = min_r2;
        self
    }

    pub fn with_demo_input(mut self, input: FeatureVector) -> Self {
        self.demo_input = input;
        self
    }
}
