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
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;

use super::RecordProvider;
use crate::errors::DataError;
use crate::record::RawRecord;

/// Reads records from a local export file.
///
/// The format is chosen by extension: `.json` holds an array of objects,
/// `.jsonl` / `.ndjson` one object per line, and anything else is read as CSV
/// with a header row. Column and key names match the [`RawRecord`] fields;
/// unknown columns are ignored and empty cells count as missing values.
#[derive(Debug, Clone)]
pub struct LocalFileProvider {
    path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Json,
    JsonLines,
}

impl LocalFileProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        LocalFileProvider { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> FileFormat {
        match self.path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
            Some(ext) if ext == "json" => FileFormat::Json,
            Some(ext) if ext == "jsonl" || ext == "ndjson" => FileFormat::JsonLines,
            _ => FileFormat::Csv,
        }
    }
}

impl RecordProvider for LocalFileProvider {
    fn fetch(&self) -> Result<Vec<RawRecord>, DataError> {
        let file = File::open(&self.path)?;
        let records = match self.format() {
            FileFormat::Csv => read_csv(file)?,
            FileFormat::Json => serde_json::from_reader(BufReader::new(file))?,
            FileFormat::JsonLines => read_json_lines(file)?,
        };
        debug!("Read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

fn read_csv(file: File) -> Result<Vec<RawRecord>, DataError> {
    let mut rdr =
        csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(file);

    let mut records = Vec::new();
    for result in rdr.deserialize::<RawRecord>() {
        records.push(result?);
    }
    Ok(records)
}

fn read_json_lines(file: File) -> Result<Vec<RawRecord>, DataError> {
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
