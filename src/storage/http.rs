// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Solr over HTTP.
//!
//! Queries go to `{base}/select` with `wt=json`; writes, deletes and commits
//! go to `{base}/update` as JSON. Each document is posted on its own so the
//! caller gets one outcome per document.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::traits::{ClientError, ConnectionFactory, Hit, SearchConnection, SearchHits, WriteOutcome};
use crate::config::AdapterConfig;
use crate::search::{Document, SearchRequest};

/// Opens [`SolrHttpConnection`]s to one core.
pub struct SolrHttpFactory {
    base_url: String,
    unique_key: String,
    timeout: Duration,
}

impl SolrHttpFactory {
    #[must_use]
    pub fn new(config: &AdapterConfig) -> Self {
        Self {
            base_url: config.base_url(),
            unique_key: config.unique_key.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ConnectionFactory for SolrHttpFactory {
    type Connection = SolrHttpConnection;

    async fn connect(&self) -> Result<SolrHttpConnection, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClientError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(SolrHttpConnection {
            client,
            base_url: self.base_url.clone(),
            unique_key: self.unique_key.clone(),
        })
    }
}

/// One short-lived HTTP session against a Solr core.
pub struct SolrHttpConnection {
    client: reqwest::Client,
    base_url: String,
    unique_key: String,
}

#[derive(Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Deserialize)]
struct SelectBody {
    #[serde(rename = "numFound")]
    num_found: u64,
    docs: Vec<serde_json::Map<String, Value>>,
}

impl SolrHttpConnection {
    async fn post_update(&self, body: &Value) -> Result<(), ClientError> {
        let url = endpoint(&self.base_url, "update", &[("wt".to_string(), "json".to_string())])?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Connection(format!("update request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Backend(format!("update rejected (HTTP {}): {}", status, text)));
        }
        Ok(())
    }

    fn document_id(&self, document: &Document) -> Option<String> {
        document.get(&self.unique_key).map(ToString::to_string)
    }
}

#[async_trait]
impl SearchConnection for SolrHttpConnection {
    async fn add(&self, documents: &[Document]) -> Result<Vec<WriteOutcome>, ClientError> {
        let mut outcomes = Vec::with_capacity(documents.len());
        for document in documents {
            let id = self.document_id(document);
            let body = json!([document]);
            match self.post_update(&body).await {
                Ok(()) => outcomes.push(WriteOutcome::Indexed { id }),
                Err(ClientError::Backend(reason)) => {
                    warn!(id = ?id, reason = %reason, "Document rejected");
                    outcomes.push(WriteOutcome::Rejected { id, reason });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcomes)
    }

    async fn query(&self, request: &SearchRequest) -> Result<SearchHits, ClientError> {
        let url = endpoint(&self.base_url, "select", &select_params(request))?;
        debug!(path = url.path(), "Solr select");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Connection(format!("select request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ClientError::Backend(format!(
                "select rejected (HTTP {})",
                response.status()
            )));
        }

        let body: SelectResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("select response parse failed: {}", e)))?;

        Ok(SearchHits {
            total: body.response.num_found,
            hits: body.response.docs.iter().map(flatten_doc).collect(),
        })
    }

    async fn delete_by_query(&self, query: &str) -> Result<(), ClientError> {
        self.post_update(&json!({ "delete": { "query": query } })).await
    }

    async fn commit(&self) -> Result<(), ClientError> {
        self.post_update(&json!({ "commit": {} })).await
    }
}

fn endpoint(base_url: &str, handler: &str, params: &[(String, String)]) -> Result<reqwest::Url, ClientError> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| ClientError::Connection(format!("invalid endpoint '{}': {}", base_url, e)))?;
    // configured params stay in front of the per-request ones
    let path = format!("{}/{}", url.path().trim_end_matches('/'), handler);
    url.set_path(&path);
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Select parameters: `q`, `wt=json`, then the request options
pub fn select_params(request: &SearchRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("q".to_string(), request.query_string()),
        ("wt".to_string(), "json".to_string()),
    ];
    params.extend(request.options.to_params());
    params
}

/// Flatten a JSON hit: strings as-is, other scalars as JSON text, arrays
/// by their first member, nulls dropped.
pub fn flatten_doc(doc: &serde_json::Map<String, Value>) -> Hit {
    doc.iter()
        .filter_map(|(key, value)| flatten_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn flatten_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(values) => values.first().and_then(flatten_value),
        other => Some(other.to_string()),
    }
}
