// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search client backends
//!
//! - [`MemoryIndex`]: in-process index (tests, embedding)
//! - `SolrHttpFactory`: Solr over HTTP (feature `http`)

mod matcher;
pub mod memory;
pub mod traits;

#[cfg(feature = "http")]
pub mod http;

pub use memory::{MemoryConnection, MemoryIndex, DEFAULT_ROWS};
pub use traits::{ClientError, ConnectionFactory, Hit, SearchConnection, SearchHits, WriteOutcome};

#[cfg(feature = "http")]
pub use http::{SolrHttpConnection, SolrHttpFactory};
