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

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use super::RecordProvider;
use crate::errors::DataError;
use crate::record::RawRecord;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_COLLECTION: &str = "networkLogs";
const DEFAULT_PAGE_SIZE: usize = 300;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Streams a document collection through the Firestore REST API.
///
/// Requests carry no credentials, so the collection must be readable
/// anonymously (security rules or the local emulator via [`with_base_url`]).
///
/// [`with_base_url`]: RemoteDocumentStoreProvider::with_base_url
#[derive(Debug, Clone)]
pub struct RemoteDocumentStoreProvider {
    base_url: String,
    project_id: String,
    collection: String,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl RemoteDocumentStoreProvider {
    pub fn new(project_id: &str) -> Self {
        RemoteDocumentStoreProvider {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = collection.to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, self.collection
        )
    }

    fn fetch_page(
        &self,
        client: &Client,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, DataError> {
        let mut request =
            client.get(self.collection_url()).query(&[("pageSize", self.page_size.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DataError::RemoteStatus { status: status.as_u16(), body });
        }
        Ok(response.json()?)
    }
}

impl RecordProvider for RemoteDocumentStoreProvider {
    fn fetch(&self) -> Result<Vec<RawRecord>, DataError> {
        info!("Fetching documents from {}", self.collection_url());
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.fetch_page(&client, page_token.as_deref())?;
            debug!("Fetched page with {} documents", page.documents.len());
            for document in &page.documents {
                records.push(decode_document(document)?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("document store {}/{}", self.project_id, self.collection)
    }
}

fn decode_document(document: &Document) -> Result<RawRecord, DataError> {
    let field = |key: &str| -> Result<Option<f64>, DataError> {
        match document.fields.get(key) {
            None => Ok(None),
            Some(value) => decode_number(value).map_err(|reason| {
                DataError::MalformedDocument(format!("{}: field {key}: {reason}", document.name))
            }),
        }
    };

    Ok(RawRecord {
        latitude: field("latitude")?,
        longitude: field("longitude")?,
        signal_dbm: field("signal_dbm")?,
        download_kbps: field("download_kbps")?,
        upload_kbps: field("upload_kbps")?,
    })
}

// Firestore wraps each value in a single-key object naming its type; 64-bit
// integers travel as strings.
fn decode_number(value: &Value) -> Result<Option<f64>, String> {
    let object = value.as_object().ok_or("expected a typed value object")?;
    if object.contains_key("nullValue") {
        return Ok(None);
    }
    if let Some(v) = object.get("doubleValue") {
        return match v {
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) => s.parse::<f64>().map(Some).map_err(|e| e.to_string()),
            _ => Err("doubleValue is not a number".to_string()),
        };
    }
    if let Some(v) = object.get("integerValue") {
        return match v {
            Value::String(s) => s.parse::<i64>().map(|i| Some(i as f64)).map_err(|e| e.to_string()),
            Value::Number(n) => Ok(n.as_f64()),
            _ => Err("integerValue is not an integer".to_string()),
        };
    }
    match object.keys().next() {
        Some(kind) => Err(format!("unsupported value type {kind}")),
        None => Err("empty value object".to_string()),
    }
}
