// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Adapter error type.

use thiserror::Error;

use crate::model::{CoercionError, SchemaError};
use crate::search::QueryError;
use crate::storage::ClientError;

/// Any failure surfaced by [`SearchAdapter`](crate::SearchAdapter).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Hydration failed: {0}")]
    Coercion(#[from] CoercionError),
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
