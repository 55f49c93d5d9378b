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

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::Dataset;
use crate::errors::DataError;

/// Splits `dataset` into `(train, test)` partitions.
///
/// The test partition holds `ceil(test_ratio * n)` records and the train
/// partition the rest. Row membership depends only on the dataset length and
/// `seed`, so repeated runs produce the same partitions.
pub fn train_test_split(
    dataset: &Dataset,
    test_ratio: f64,
    seed: u64,
) -> Result<(Dataset, Dataset), DataError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(DataError::InvalidRatio(test_ratio));
    }

    let n = dataset.len();
    let (n_train, n_test) = partition_sizes(n, test_ratio);
    if n < 2 || n_train == 0 || n_test == 0 {
        return Err(DataError::InsufficientData {
            available: n,
            required: minimum_rows(test_ratio),
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_indices, train_indices) = indices.split_at(n_test);
    debug!("Split data: train_size={}, test_size={}", n_train, n_test);

    Ok((dataset.select(train_indices), dataset.select(test_indices)))
}

fn partition_sizes(n: usize, test_ratio: f64) -> (usize, usize) {
    let n_test = ((n as f64) * test_ratio).ceil() as usize;
    let n_test = n_test.min(n);
    (n - n_test, n_test)
}

fn both_non_empty(n: usize, test_ratio: f64) -> bool {
    let (n_train, n_test) = partition_sizes(n, test_ratio);
    n_train > 0 && n_test > 0
}

// Smallest dataset for which both partitions are non-empty. Gallops to an
// upper bound, then bisects, so ratios close to 1 stay cheap.
fn minimum_rows(test_ratio: f64) -> usize {
    let mut lo = 1;
    let mut hi = 2;
    while !both_non_empty(hi, test_ratio) {
        lo = hi;
        hi = match hi.checked_mul(2) {
            Some(next) => next,
            None => return usize::MAX,
        };
    }
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if both_non_empty(mid, test_ratio) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}
