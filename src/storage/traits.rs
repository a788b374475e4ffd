// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search client seams.
//!
//! A [`ConnectionFactory`] hands out one owned [`SearchConnection`] per unit
//! of work. Dropping the connection releases it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::search::{Document, SearchRequest};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Search backend error: {0}")]
    Backend(String),
    #[error("Malformed query '{query}': {reason}")]
    MalformedQuery { query: String, reason: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One raw hit: storage key → wire string
pub type Hit = BTreeMap<String, String>;

/// Result of a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Total matching documents (may exceed `hits.len()` when paged)
    pub total: u64,
    /// Hits in rank/sort order
    pub hits: Vec<Hit>,
}

/// Per-document result of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Accepted by the index
    Indexed { id: Option<String> },
    /// Refused; the rest of the batch is unaffected
    Rejected { id: Option<String>, reason: String },
}

impl WriteOutcome {
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }

    /// Unique key of the document, when it had one
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Indexed { id } | Self::Rejected { id, .. } => id.as_deref(),
        }
    }
}

/// A live connection to a search index.
#[async_trait]
pub trait SearchConnection: Send + Sync {
    /// Submit documents for indexing; one outcome per document, in order
    async fn add(&self, documents: &[Document]) -> Result<Vec<WriteOutcome>, ClientError>;

    /// Run a translated query
    async fn query(&self, request: &SearchRequest) -> Result<SearchHits, ClientError>;

    /// Delete every document matching a query string
    async fn delete_by_query(&self, query: &str) -> Result<(), ClientError>;

    /// Make pending writes visible
    async fn commit(&self) -> Result<(), ClientError>;
}

/// Opens connections.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    type Connection: SearchConnection;

    /// Acquire a fresh connection
    async fn connect(&self) -> Result<Self::Connection, ClientError>;
}
