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

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::boosting::GradientBoostingRegressor;
use crate::errors::{ModelError, PersistenceError};
use crate::record::{FeatureSpec, FeatureVector, Target};

/// A fitted regressor together with the column contract it was trained on.
///
/// Persisting the feature order and target next to the trees means a loaded
/// model can lay out inference rows itself instead of trusting the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    features: FeatureSpec,
    target: Target,
    model: GradientBoostingRegressor,
}

impl ModelArtifact {
    pub fn new(features: FeatureSpec, target: Target, model: GradientBoostingRegressor) -> Self {
        ModelArtifact { features, target, model }
    }

    pub fn features(&self) -> &FeatureSpec {
        &self.features
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn model(&self) -> &GradientBoostingRegressor {
        &self.model
    }

    /// Predicts for rows already laid out in [`features`](Self::features) order.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        self.model.predict(x)
    }

    pub fn predict_one(&self, input: &FeatureVector) -> Result<f64, ModelError> {
        let x = Array1::from_vec(self.features.vector(input)).insert_axis(Axis(0));
        Ok(self.model.predict(&x)?[0])
    }

    /// Writes the artifact as JSON, replacing any existing file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        info!("Saved model artifact to {}", path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<ModelArtifact, PersistenceError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
