// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Translation
//!
//! Records and queries in, documents and Solr requests out.
//!
//! # Architecture
//!
//! ```text
//! Record ──→ DocumentMapper ──→ Document ──→ SearchConnection::add
//!
//! QueryBuilder ──→ Query
//!     ↓
//!     SolrTranslator::build_request ──→ SearchRequest (q + options)
//!     ↓
//!     SearchConnection::query ──→ SearchHits
//!     ↓
//!     SolrTranslator::hydrate ──→ typed values ──→ Resource::load
//! ```

mod document;
mod query_builder;
mod request;
mod solr_translator;

pub use document::{Document, DocumentMapper};
pub use query_builder::{
    Condition, Direction, Operator, Query, QueryBuilder, QueryError, SortTerm,
};
pub use request::{RequestOptions, SearchRequest, SortClause, SortOrder};
pub use solr_translator::SolrTranslator;
