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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("No records were fetched from the record provider")]
    EmptyDataset,

    #[error("Not enough records to split: {available} available, at least {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("Test ratio must be strictly between 0 and 1, got {0}")]
    InvalidRatio(f64),

    #[error("Failed to open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request to document store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document store returned status {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Input data is empty")]
    EmptyInput,

    #[error("Input data has no feature columns")]
    NoFeatures,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Input contains NaN or infinite values")]
    InvalidNumericValue,

    #[error("Invalid hyperparameter: {0}")]
    InvalidParameter(String),
}

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("Input arrays are empty")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Input contains NaN or infinite values")]
    InvalidNumericValue,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to access model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize model: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model rejected: R² {r2:.4} is below the required minimum {min_r2:.4}")]
    BelowThreshold { r2: f64, min_r2: f64 },
}
