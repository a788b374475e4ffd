// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-process search index.
//!
//! Behaves like a single Solr core: documents are keyed by a unique key
//! field, writes stay pending until [`commit`](SearchConnection::commit), and
//! queries are evaluated with the same syntax the translator emits.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::matcher::{compare, values_of, Matcher};
use super::traits::{ClientError, ConnectionFactory, Hit, SearchConnection, SearchHits, WriteOutcome};
use crate::model::FieldValue;
use crate::search::{Document, SearchRequest, SortClause, SortOrder};

/// Page size when a request does not set `rows`
pub const DEFAULT_ROWS: usize = 10;

#[derive(Debug, Clone)]
enum PendingOp {
    Add(String, Document),
    DeleteByQuery(Matcher),
}

struct IndexInner {
    unique_key: String,
    committed: DashMap<String, Document>,
    pending: Mutex<Vec<PendingOp>>,
    opened: AtomicUsize,
    released: AtomicUsize,
}

/// In-memory index; cheap to clone, clones share state.
#[derive(Clone)]
pub struct MemoryIndex {
    inner: Arc<IndexInner>,
}

impl MemoryIndex {
    /// Create an empty index keyed by `unique_key`
    #[must_use]
    pub fn new(unique_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(IndexInner {
                unique_key: unique_key.into(),
                committed: DashMap::new(),
                pending: Mutex::new(Vec::new()),
                opened: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
            }),
        }
    }

    /// Committed document count
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.committed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.committed.is_empty()
    }

    /// Uncommitted operation count
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Committed document by unique key
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Document> {
        self.inner.committed.get(id).map(|r| r.value().clone())
    }

    /// Connections handed out so far
    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Connections dropped so far
    #[must_use]
    pub fn connections_released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new("id")
    }
}

#[async_trait]
impl ConnectionFactory for MemoryIndex {
    type Connection = MemoryConnection;

    async fn connect(&self) -> Result<MemoryConnection, ClientError> {
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            inner: self.inner.clone(),
        })
    }
}

/// Connection to a [`MemoryIndex`]; released on drop.
pub struct MemoryConnection {
    inner: Arc<IndexInner>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.inner.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl MemoryConnection {
    fn document_id(&self, document: &Document) -> Option<String> {
        match document.get(&self.inner.unique_key) {
            None | Some(FieldValue::List(_)) => None,
            Some(value) => Some(value.to_string()),
        }
    }
}

#[async_trait]
impl SearchConnection for MemoryConnection {
    async fn add(&self, documents: &[Document]) -> Result<Vec<WriteOutcome>, ClientError> {
        let mut pending = self.inner.pending.lock();
        let outcomes = documents
            .iter()
            .map(|document| match self.document_id(document) {
                Some(id) => {
                    pending.push(PendingOp::Add(id.clone(), document.clone()));
                    WriteOutcome::Indexed { id: Some(id) }
                }
                None => WriteOutcome::Rejected {
                    id: None,
                    reason: format!("missing unique key field '{}'", self.inner.unique_key),
                },
            })
            .collect();
        Ok(outcomes)
    }

    async fn query(&self, request: &SearchRequest) -> Result<SearchHits, ClientError> {
        let matcher = Matcher::parse(&request.query_string())?;

        let mut matched: Vec<Document> = self
            .inner
            .committed
            .iter()
            .filter(|entry| matcher.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // Stable base order so unsorted paging is deterministic
        let unique_key = self.inner.unique_key.as_str();
        matched.sort_by(|a, b| values_of(a, unique_key).cmp(&values_of(b, unique_key)));
        if let Some(sort) = &request.options.sort {
            matched.sort_by(|a, b| sort_documents(sort, a, b));
        }

        let total = matched.len() as u64;
        let start = request.options.start.unwrap_or(0);
        let rows = request.options.rows.unwrap_or(DEFAULT_ROWS);
        let hits = matched.iter().skip(start).take(rows).map(to_hit).collect();

        Ok(SearchHits { total, hits })
    }

    async fn delete_by_query(&self, query: &str) -> Result<(), ClientError> {
        let matcher = Matcher::parse(query)?;
        self.inner.pending.lock().push(PendingOp::DeleteByQuery(matcher));
        Ok(())
    }

    async fn commit(&self) -> Result<(), ClientError> {
        let ops: Vec<PendingOp> = std::mem::take(&mut *self.inner.pending.lock());
        let count = ops.len();

        for op in ops {
            match op {
                PendingOp::Add(id, document) => {
                    self.inner.committed.insert(id, document);
                }
                PendingOp::DeleteByQuery(matcher) => {
                    self.inner.committed.retain(|_, doc| !matcher.matches(doc));
                }
            }
        }

        debug!(ops = count, documents = self.inner.committed.len(), "Memory index committed");
        Ok(())
    }
}

fn sort_documents(sort: &[SortClause], a: &Document, b: &Document) -> CmpOrdering {
    for clause in sort {
        let left = values_of(a, &clause.field);
        let right = values_of(b, &clause.field);
        let ord = match (left.first(), right.first()) {
            (Some(l), Some(r)) => compare(l, r),
            // missing values sort last in either direction
            (Some(_), None) => return CmpOrdering::Less,
            (None, Some(_)) => return CmpOrdering::Greater,
            (None, None) => CmpOrdering::Equal,
        };
        let ord = match clause.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        };
        if ord != CmpOrdering::Equal {
            return ord;
        }
    }
    CmpOrdering::Equal
}

/// Flatten a document into a raw hit; lists keep their first member
fn to_hit(document: &Document) -> Hit {
    document
        .iter()
        .filter_map(|(key, value)| {
            let wire = match value {
                FieldValue::List(values) => values.first()?.to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), wire))
        })
        .collect()
}
