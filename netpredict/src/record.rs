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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One observation as delivered by a record provider.
///
/// Every field is optional: providers hand over whatever the logging client
/// managed to capture, and cleaning decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub signal_dbm: Option<f64>,
    pub download_kbps: Option<f64>,
    pub upload_kbps: Option<f64>,
}

/// A cleaned observation with throughput expressed in megabits per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub latitude: f64,
    pub longitude: f64,
    pub signal_dbm: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

impl Record {
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::SignalDbm => self.signal_dbm,
            Feature::Latitude => self.latitude,
            Feature::Longitude => self.longitude,
        }
    }

    pub fn target(&self, target: Target) -> f64 {
        match target {
            Target::DownloadMbps => self.download_mbps,
            Target::UploadMbps => self.upload_mbps,
        }
    }
}

/// A model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    SignalDbm,
    Latitude,
    Longitude,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::SignalDbm => "signal_dbm",
            Feature::Latitude => "latitude",
            Feature::Longitude => "longitude",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signal_dbm" => Ok(Feature::SignalDbm),
            "latitude" => Ok(Feature::Latitude),
            "longitude" => Ok(Feature::Longitude),
            other => Err(format!("unknown feature: {other}")),
        }
    }
}

/// The throughput column the model learns to predict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    #[default]
    DownloadMbps,
    UploadMbps,
}

impl Target {
    pub fn name(&self) -> &'static str {
        match self {
            Target::DownloadMbps => "download_mbps",
            Target::UploadMbps => "upload_mbps",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "download_mbps" => Ok(Target::DownloadMbps),
            "upload_mbps" => Ok(Target::UploadMbps),
            other => Err(format!("unknown target: {other}")),
        }
    }
}

/// Ordered list of input columns.
///
/// The order is part of the model contract: rows handed to a fitted model must
/// lay their values out in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSpec(Vec<Feature>);

impl FeatureSpec {
    pub fn new(features: Vec<Feature>) -> Self {
        FeatureSpec(features)
    }

    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(Feature::name).collect()
    }

    pub fn row(&self, record: &Record) -> Vec<f64> {
        self.0.iter().map(|&f| record.feature(f)).collect()
    }

    pub fn vector(&self, input: &FeatureVector) -> Vec<f64> {
        self.0.iter().map(|&f| input.get(f)).collect()
    }
}

impl Default for FeatureSpec {
    fn default() -> Self {
        FeatureSpec(vec![Feature::SignalDbm, Feature::Latitude, Feature::Longitude])
    }
}

/// Named inference input, independent of column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub signal_dbm: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl FeatureVector {
    /// Lagos, at a middling -80 dBm.
    pub const DEMO: FeatureVector =
        FeatureVector { signal_dbm: -80.0, latitude: 6.5244, longitude: 3.3792 };

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::SignalDbm => self.signal_dbm,
            Feature::Latitude => self.latitude,
            Feature::Longitude => self.longitude,
        }
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        FeatureVector::DEMO
    }
}
