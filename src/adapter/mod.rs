// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search adapter.
//!
//! The [`SearchAdapter`] ties the pieces together:
//! - [`DocumentMapper`](crate::search::DocumentMapper) turns records into documents
//! - [`SolrTranslator`](crate::search::SolrTranslator) turns queries into requests
//!   and hits back into values
//! - a [`ConnectionFactory`] supplies one connection per operation
//!
//! # Connection scope
//!
//! ```text
//! connect → run → release (drop) → log/metrics → return
//! ```
//!
//! Every operation runs inside one scope. The connection is released whether
//! the work succeeds or fails, and failures are logged once here before they
//! propagate. Nothing is retried.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use search_adapter::{AdapterConfig, SearchAdapter};
//! use search_adapter::model::{FieldDescriptor, FieldType, ModelSchema, Resource};
//! use search_adapter::search::QueryBuilder;
//! use search_adapter::storage::MemoryIndex;
//!
//! # #[tokio::main]
//! # async fn main() -> search_adapter::Result<()> {
//! let book = Arc::new(ModelSchema::new("Book", vec![
//!     FieldDescriptor::new("id", FieldType::Text),
//!     FieldDescriptor::new("price", FieldType::Integer),
//! ])?);
//!
//! let adapter = SearchAdapter::new(MemoryIndex::default(), AdapterConfig::default());
//! let record = Resource::new(book.clone()).with("id", "b1")?.with("price", 12)?;
//! adapter.create(&[record]).await?;
//!
//! let query = QueryBuilder::new(book).gte("price", 10).build()?;
//! let found = adapter.read_many(&query).await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

mod crud;

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, error};

use crate::config::AdapterConfig;
use crate::error::Result;
use crate::metrics::{self, LatencyTimer};
use crate::storage::{ClientError, ConnectionFactory};

/// Future returned by work run inside [`SearchAdapter::with_connection`].
///
/// It borrows the connection for `'c`, which ends before release.
pub type ScopedFuture<'c, T> = Pin<Box<dyn Future<Output = std::result::Result<T, ClientError>> + Send + 'c>>;

/// CRUD orchestrator over a search index.
pub struct SearchAdapter<S: ConnectionFactory> {
    factory: S,
    config: AdapterConfig,
}

impl<S: ConnectionFactory> SearchAdapter<S> {
    pub fn new(factory: S, config: AdapterConfig) -> Self {
        Self { factory, config }
    }

    #[must_use]
    pub fn factory(&self) -> &S {
        &self.factory
    }

    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Run `work` on a freshly acquired connection, then release it.
    ///
    /// Acquisition and work failures are logged with the operation name,
    /// counted, and returned unchanged. The connection is dropped before this
    /// returns in every case.
    pub async fn with_connection<T, W>(&self, operation: &'static str, work: W) -> Result<T>
    where
        W: for<'c> FnOnce(&'c S::Connection) -> ScopedFuture<'c, T>,
    {
        let _timer = LatencyTimer::new(operation);

        let connection = match self.factory.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                error!(operation, error = %e, "Failed to acquire search connection");
                metrics::record_connection_error(operation);
                metrics::record_operation(operation, "error");
                return Err(e.into());
            }
        };

        let result = work(&connection).await;
        drop(connection);
        debug!(operation, "Search connection released");

        match result {
            Ok(value) => {
                metrics::record_operation(operation, "success");
                Ok(value)
            }
            Err(e) => {
                error!(operation, error = %e, "Search operation failed");
                metrics::record_operation(operation, "error");
                Err(e.into())
            }
        }
    }
}
