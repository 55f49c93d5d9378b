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

use log::{debug, warn};
use ndarray::{Array1, Array2};

use crate::errors::DataError;
use crate::record::{FeatureSpec, RawRecord, Record, Target};

const KBPS_PER_MBPS: f64 = 1000.0;

/// Cleaned, immutable collection of records used for training and evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

/// Result of [`clean`]: the retained dataset and how many records were discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOutcome {
    pub dataset: Dataset,
    pub dropped: usize,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Dataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Builds a `(n_rows, spec.len())` feature matrix in the order given by `spec`.
    pub fn features(&self, spec: &FeatureSpec) -> Array2<f64> {
        let features = spec.features();
        Array2::from_shape_fn((self.records.len(), features.len()), |(i, j)| {
            self.records[i].feature(features[j])
        })
    }

    pub fn targets(&self, target: Target) -> Array1<f64> {
        self.records.iter().map(|r| r.target(target)).collect()
    }

    pub(crate) fn select(&self, indices: &[usize]) -> Dataset {
        Dataset { records: indices.iter().map(|&i| self.records[i]).collect() }
    }
}

/// Converts raw provider output into a [`Dataset`].
///
/// Throughput fields default to zero when absent and are converted from kbps to
/// Mbps. Records without a signal reading or a location, or with a NaN or
/// infinite value in any retained field, are dropped. An empty input is an
/// error; an input where every record is dropped yields an empty dataset.
pub fn clean(raw: Vec<RawRecord>) -> Result<CleaningOutcome, DataError> {
    if raw.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    let total = raw.len();
    let records: Vec<Record> = raw.into_iter().filter_map(normalize).collect();
    let dropped = total - records.len();

    if dropped > 0 {
        warn!("Dropped {} of {} records with missing or invalid fields", dropped, total);
    }
    debug!("Cleaning kept {} records", records.len());

    Ok(CleaningOutcome { dataset: Dataset::new(records), dropped })
}

fn normalize(raw: RawRecord) -> Option<Record> {
    let record = Record {
        latitude: raw.latitude?,
        longitude: raw.longitude?,
        signal_dbm: raw.signal_dbm?,
        download_mbps: raw.download_kbps.unwrap_or(0.0) / KBPS_PER_MBPS,
        upload_mbps: raw.upload_kbps.unwrap_or(0.0) / KBPS_PER_MBPS,
    };

    let values = [
        record.latitude,
        record.longitude,
        record.signal_dbm,
        record.download_mbps,
        record.upload_mbps,
    ];
    values.iter().all(|v| v.is_finite()).then_some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Feature;
    use ndarray::array;

    fn raw(
        signal_dbm: Option<f64>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        download_kbps: Option<f64>,
        upload_kbps: Option<f64>,
    ) -> RawRecord {
        RawRecord { latitude, longitude, signal_dbm, download_kbps, upload_kbps }
    }

    #[test]
    fn test_clean_empty_input() {
        let result = clean(Vec::new());
        assert!(matches!(result, Err(DataError::EmptyDataset)));
    }

    #[test]
    fn test_clean_converts_kbps_to_mbps() {
        let outcome =
            clean(vec![raw(Some(-70.0), Some(6.5), Some(3.4), Some(50000.0), Some(12500.0))])
                .unwrap();
        let record = outcome.dataset.records()[0];
        assert_eq!(record.download_mbps, 50.0);
        assert_eq!(record.upload_mbps, 12.5);
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn test_clean_missing_throughput_defaults_to_zero() {
        let outcome = clean(vec![raw(Some(-70.0), Some(6.5), Some(3.4), None, None)]).unwrap();
        let record = outcome.dataset.records()[0];
        assert_eq!(record.download_mbps, 0.0);
        assert_eq!(record.upload_mbps, 0.0);
    }

    #[test]
    fn test_clean_drops_incomplete_records() {
        let outcome = clean(vec![
            raw(Some(-70.0), Some(6.5), Some(3.4), Some(40000.0), Some(10000.0)),
            raw(None, Some(6.5), Some(3.4), Some(40000.0), Some(10000.0)),
            raw(Some(-80.0), None, Some(3.4), Some(40000.0), Some(10000.0)),
            raw(Some(-80.0), Some(6.5), None, Some(40000.0), Some(10000.0)),
            raw(Some(f64::NAN), Some(6.5), Some(3.4), Some(40000.0), Some(10000.0)),
            raw(Some(-90.0), Some(6.6), Some(3.5), Some(f64::NAN), Some(1000.0)),
            raw(Some(-95.0), Some(6.7), Some(3.6), Some(5000.0), None),
        ])
        .unwrap();

        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.dropped, 5);
        for record in outcome.dataset.records() {
            assert!(record.signal_dbm.is_finite());
            assert!(record.latitude.is_finite());
            assert!(record.longitude.is_finite());
            assert!(record.download_mbps.is_finite());
            assert!(record.upload_mbps.is_finite());
        }
    }

    #[test]
    fn test_clean_all_dropped_is_not_an_error() {
        let outcome = clean(vec![raw(None, None, None, Some(1.0), Some(1.0))]).unwrap();
        assert!(outcome.dataset.is_empty());
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_features_and_targets() {
        let outcome = clean(vec![
            raw(Some(-70.0), Some(6.5), Some(3.4), Some(40000.0), Some(10000.0)),
            raw(Some(-90.0), Some(6.6), Some(3.5), Some(5000.0), Some(1000.0)),
        ])
        .unwrap();
        let dataset = outcome.dataset;

        let x = dataset.features(&FeatureSpec::default());
        assert_eq!(x, array![[-70.0, 6.5, 3.4], [-90.0, 6.6, 3.5]]);

        let x = dataset.features(&FeatureSpec::new(vec![Feature::Latitude]));
        assert_eq!(x, array![[6.5], [6.6]]);

        assert_eq!(dataset.targets(Target::DownloadMbps), array![40.0, 5.0]);
        assert_eq!(dataset.targets(Target::UploadMbps), array![10.0, 1.0]);
    }
}
