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

//! Throughput regression for network-quality logs.
//!
//! Raw observations of signal strength, location and measured throughput are
//! fetched through a [`RecordProvider`](data::RecordProvider), cleaned into a
//! [`Dataset`](dataset::Dataset), split, and used to fit a gradient-boosted
//! tree ensemble that predicts download (or upload) speed in Mbps. The fitted
//! model is persisted together with its feature order as a JSON
//! [`ModelArtifact`](artifact::ModelArtifact).
//!
//! ```no_run
//! use netpredict::config::PipelineConfig;
//! use netpredict::data::LocalFileProvider;
//! use netpredict::pipeline;
//!
//! let config = PipelineConfig::new();
//! let provider = LocalFileProvider::new(&config.csv_path);
//! let result = pipeline::execute(&provider, &config)?;
//! println!("R²: {:.4}", result.report.r2);
//! # Ok::<(), netpredict::errors::PipelineError>(())
//! ```

pub mod artifact;
pub mod boosting;
pub mod config;
pub mod data;
pub mod dataset;
pub mod errors;
pub mod metrics;
pub mod objective;
pub mod pipeline;
pub mod record;
pub mod split;
pub mod tree;

pub use ndarray;

pub use artifact::ModelArtifact;
pub use boosting::{BoostingParams, GradientBoostingRegressor};
pub use config::PipelineConfig;
pub use pipeline::{execute, run, PipelineResult};
pub use record::{Feature, FeatureSpec, FeatureVector, Target};
