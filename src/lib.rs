//! # Search Adapter
//!
//! Maps model records onto a Solr-style search index and translates abstract
//! queries into Solr request strings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SearchAdapter                        │
//! │  • create / read_many / read_one / update / delete          │
//! │  • One connection per operation, released on every path     │
//! └─────────────────────────────────────────────────────────────┘
//!              │                                  │
//!        (records out)                       (queries out)
//!              ▼                                  ▼
//! ┌───────────────────────────┐    ┌────────────────────────────┐
//! │      DocumentMapper       │    │       SolrTranslator       │
//! │  • discriminator + fields │    │  • +type:<model> first     │
//! │  • full or changed-only   │    │  • one fragment per cond.  │
//! └───────────────────────────┘    │  • rows / start / sort     │
//!              │                   │  • hits → typed values     │
//!              │                   └────────────────────────────┘
//!              ▼                                  │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Search connection                       │
//! │  • MemoryIndex (in-process)                                 │
//! │  • SolrHttpFactory (feature `http`)                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use search_adapter::{AdapterConfig, SearchAdapter};
//! use search_adapter::model::{FieldDescriptor, FieldType, ModelSchema, Resource};
//! use search_adapter::search::{Direction, QueryBuilder};
//! use search_adapter::storage::MemoryIndex;
//!
//! #[tokio::main]
//! async fn main() -> search_adapter::Result<()> {
//!     let book = Arc::new(ModelSchema::new("Book", vec![
//!         FieldDescriptor::new("id", FieldType::Text),
//!         FieldDescriptor::new("title", FieldType::Text),
//!         FieldDescriptor::new("price", FieldType::Integer),
//!     ])?);
//!
//!     let adapter = SearchAdapter::new(MemoryIndex::default(), AdapterConfig::default());
//!
//!     let dune = Resource::new(book.clone())
//!         .with("id", "b1")?
//!         .with("title", "Dune")?
//!         .with("price", 12)?;
//!     adapter.create(&[dune]).await?;
//!
//!     // q = "+type:book +price:[10 TO *]", sort = "price desc"
//!     let query = QueryBuilder::new(book)
//!         .gte("price", 10)
//!         .order("price", Direction::Desc)
//!         .build()?;
//!
//!     if let Some(found) = adapter.read_one(&query).await? {
//!         println!("Found: {:?}", found.get("title"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`adapter`]: The [`SearchAdapter`] CRUD orchestrator
//! - [`model`]: Field types, schemas and records
//! - [`search`]: Query model, request options, document mapping, Solr translation
//! - [`storage`]: Connection seams and backends
//! - [`config`]: [`AdapterConfig`]
//! - [`metrics`]: `metrics` crate instrumentation

pub mod adapter;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod search;
pub mod storage;

pub use adapter::{ScopedFuture, SearchAdapter};
pub use config::AdapterConfig;
pub use error::{AdapterError, Result};
pub use model::{FieldDescriptor, FieldType, FieldValue, ModelSchema, Record, Resource};
pub use search::{Document, DocumentMapper, Query, QueryBuilder, RequestOptions, SearchRequest, SolrTranslator};
pub use storage::{ClientError, ConnectionFactory, MemoryIndex, SearchConnection, SearchHits, WriteOutcome};
pub use metrics::LatencyTimer;
