// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Solr Translator
//!
//! Translates an abstract [`Query`] into a Lucene/Solr query string plus
//! request options, and hydrates raw hits back into typed values.
//!
//! # Query Syntax
//!
//! ```text
//! +type:book                - Type filter (always first)
//! +field:value              - Equals
//! +field:(v1 v2)            - Equals a sequence / membership
//! -field:value              - Not equals
//! +field:{value TO *}       - Greater than
//! +field:[value TO *]       - Greater than or equal
//! +field:{* TO value}       - Less than
//! +field:[* TO value]       - Less than or equal
//! +field:J*n                - Like (`%` rewritten to `*`)
//! ```
//!
//! Values are inserted as they render; nothing is escaped.

use std::sync::Arc;

use tracing::debug;

use super::query_builder::{Condition, Direction, Operator, Query, SortTerm};
use super::request::{RequestOptions, SearchRequest, SortClause, SortOrder};
use crate::model::{CoercionError, FieldDescriptor, FieldValue, DISCRIMINATOR_KEY};
use crate::storage::Hit;

/// Solr query translator
pub struct SolrTranslator;

impl SolrTranslator {
    /// Translate a query.
    ///
    /// `extra` options are applied first; rows, start and sort derived from the
    /// query override them key by key.
    pub fn build_request(query: &Query, extra: RequestOptions) -> SearchRequest {
        let mut fragments = Vec::with_capacity(query.conditions().len() + 1);
        fragments.push(Self::type_fragment(&query.model().type_name()));
        fragments.extend(query.conditions().iter().map(Self::translate_condition));

        let derived = RequestOptions {
            rows: query.limit(),
            start: query.offset(),
            sort: Self::translate_order(query.order()),
        };

        let request = SearchRequest::new(fragments, extra.merge(derived));
        debug!(
            model = %query.model().name(),
            q = %request.query_string(),
            options = ?request.options,
            "Translated query"
        );
        request
    }

    /// Translate a query for a single-result read: `{start: 0, rows: 1}`
    pub fn build_single_request(query: &Query) -> SearchRequest {
        Self::build_request(query, RequestOptions::default()).single()
    }

    /// Mandatory type filter: `+type:<name>`
    #[must_use]
    pub fn type_fragment(type_name: &str) -> String {
        format!("+{}:{}", DISCRIMINATOR_KEY, type_name)
    }

    /// Translate one condition into exactly one fragment
    #[must_use]
    pub fn translate_condition(condition: &Condition) -> String {
        let field = &condition.field().field;
        let value = condition.value();

        match condition.operator() {
            Operator::Eql => format!("+{}:{}", field, value),
            Operator::Not => format!("-{}:{}", field, value),
            Operator::Gt => format!("+{}:{{{} TO *}}", field, value),
            Operator::Gte => format!("+{}:[{} TO *]", field, value),
            Operator::Lt => format!("+{}:{{* TO {}}}", field, value),
            Operator::Lte => format!("+{}:[* TO {}]", field, value),
            Operator::In => format!("+{}:{}", field, Self::set_value(value)),
            Operator::Like => format!("+{}:{}", field, value.to_string().replace('%', "*")),
        }
    }

    /// Sort terms as ordered `{storage key: direction}` clauses; `None` when empty
    #[must_use]
    pub fn translate_order(order: &[SortTerm]) -> Option<Vec<SortClause>> {
        if order.is_empty() {
            return None;
        }
        Some(
            order
                .iter()
                .map(|term| SortClause {
                    field: term.field.field.clone(),
                    order: match term.direction {
                        Direction::Asc => SortOrder::Ascending,
                        Direction::Desc => SortOrder::Descending,
                    },
                })
                .collect(),
        )
    }

    /// Coerce a raw hit into values, one per field, in field order.
    ///
    /// Coercion failures propagate.
    pub fn hydrate(
        hit: &Hit,
        fields: &[Arc<FieldDescriptor>],
    ) -> Result<Vec<Option<FieldValue>>, CoercionError> {
        fields
            .iter()
            .map(|field| field.typecast(hit.get(&field.field).map(String::as_str)))
            .collect()
    }

    fn set_value(value: &FieldValue) -> String {
        match value {
            FieldValue::List(values) => format!("({})", FieldValue::join_terms(values)),
            scalar => format!("({})", scalar),
        }
    }
}
