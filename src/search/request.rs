// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search requests: the query string plus request options.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Sort order as the search client names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Short form used in select parameters
    #[must_use]
    pub fn short(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// One sort directive: `{field: order}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

impl Serialize for SortClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.order)?;
        map.end()
    }
}

/// Request options: page size, offset and ordering.
///
/// Absent keys are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// Offset of the first hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    /// Ordered sort directives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortClause>>,
}

impl RequestOptions {
    /// Options selecting a single hit from the top
    #[must_use]
    pub fn single() -> Self {
        Self {
            rows: Some(1),
            start: Some(0),
            sort: None,
        }
    }

    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    /// Merge `overrides` on top of `self`, key by key.
    ///
    /// Every key set in `overrides` wins; keys it leaves unset keep the value
    /// from `self`.
    #[must_use]
    pub fn merge(self, overrides: RequestOptions) -> Self {
        Self {
            rows: overrides.rows.or(self.rows),
            start: overrides.start.or(self.start),
            sort: overrides.sort.or(self.sort),
        }
    }

    /// Select parameters: `start`, `rows`, `sort=field asc,other desc`
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(start) = self.start {
            params.push(("start".to_string(), start.to_string()));
        }
        if let Some(rows) = self.rows {
            params.push(("rows".to_string(), rows.to_string()));
        }
        if let Some(sort) = &self.sort {
            let spec = sort
                .iter()
                .map(|clause| format!("{} {}", clause.field, clause.order.short()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("sort".to_string(), spec));
        }
        params
    }
}

/// Translated query: fragments in order, plus options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    fragments: Vec<String>,
    pub options: RequestOptions,
}

impl SearchRequest {
    pub(crate) fn new(fragments: Vec<String>, options: RequestOptions) -> Self {
        Self { fragments, options }
    }

    /// Query string: fragments joined by single spaces
    #[must_use]
    pub fn query_string(&self) -> String {
        self.fragments.join(" ")
    }

    /// Fragments in order; the first is always the type filter
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Replace the options with a single-hit window
    #[must_use]
    pub fn single(mut self) -> Self {
        self.options = self.options.merge(RequestOptions::single());
        self
    }
}
