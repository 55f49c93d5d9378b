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

pub mod file;
pub mod firestore;

pub use file::LocalFileProvider;
pub use firestore::RemoteDocumentStoreProvider;

use log::info;

use crate::errors::DataError;
use crate::record::RawRecord;

/// A source of raw network-quality observations.
///
/// The pipeline depends only on this trait, so a local export, a remote
/// document store and an in-memory fixture are interchangeable. Implementors
/// return every record they can read; cleaning happens later and never inside
/// a provider.
pub trait RecordProvider {
    /// Fetches all available records.
    ///
    /// # Errors
    /// Returns a [`DataError`] when the underlying source cannot be read or
    /// decoded. An empty result is not an error at this level.
    fn fetch(&self) -> Result<Vec<RawRecord>, DataError>;

    /// Short human-readable description of the source, used in log lines.
    fn describe(&self) -> String;
}

/// Serves a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    records: Vec<RawRecord>,
}

impl InMemoryProvider {
    pub fn new(records: Vec<RawRecord>) -> Self {
        InMemoryProvider { records }
    }
}

impl RecordProvider for InMemoryProvider {
    fn fetch(&self) -> Result<Vec<RawRecord>, DataError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} records)", self.records.len())
    }
}

/// Fetches records from any provider.
pub fn fetch_records(provider: &dyn RecordProvider) -> Result<Vec<RawRecord>, DataError> {
    info!("Fetching records from {}", provider.describe());
    let records = provider.fetch()?;
    info!("Fetched {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_provider() {
        let record = RawRecord { signal_dbm: Some(-75.0), ..RawRecord::default() };
        let provider = InMemoryProvider::new(vec![record.clone(), record]);

        let records = fetch_records(&provider).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].signal_dbm, Some(-75.0));
        assert_eq!(provider.describe(), "in-memory (2 records)");
    }
}
