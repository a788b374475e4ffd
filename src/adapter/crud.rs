// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! CRUD operations.
//!
//! - `create()` - Index full documents for new records
//! - `read_many()` / `read_many_with()` - Query and hydrate
//! - `read_one()` - Single-result query
//! - `update()` - Read, apply attributes, resubmit
//! - `delete()` - Delete by query
//! - `commit()` - Explicit commit when autocommit is off

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::metrics;
use crate::model::{FieldValue, Record, Resource};
use crate::search::{Document, DocumentMapper, Query, RequestOptions, SolrTranslator};
use crate::storage::{ClientError, ConnectionFactory, Hit, SearchConnection, SearchHits, WriteOutcome};

use super::SearchAdapter;

/// Page size used when `update` walks every match of an unpaged query
pub const UPDATE_PAGE_ROWS: usize = 100;

impl<S: ConnectionFactory> SearchAdapter<S> {
    /// Index new records as full documents.
    ///
    /// Returns one outcome per record, in input order. A rejected document
    /// does not fail the call.
    pub async fn create<R: Record>(&self, records: &[R]) -> Result<Vec<WriteOutcome>> {
        let documents: Vec<Document> = records
            .iter()
            .map(|record| DocumentMapper::to_document(record, false))
            .collect();
        self.write_documents("create", documents).await
    }

    /// Records matching `query`, hydrated in hit order.
    pub async fn read_many(&self, query: &Query) -> Result<Vec<Resource>> {
        self.read_many_with(query, RequestOptions::default()).await
    }

    /// [`read_many`](Self::read_many) with extra request options.
    ///
    /// Options derived from the query win over `extra` key by key.
    pub async fn read_many_with(&self, query: &Query, extra: RequestOptions) -> Result<Vec<Resource>> {
        let request = SolrTranslator::build_request(query, extra);
        let hits: SearchHits = self
            .with_connection("read_many", move |conn| {
                Box::pin(async move { conn.query(&request).await })
            })
            .await?;

        metrics::record_hits("read_many", hits.total);
        debug!(total = hits.total, returned = hits.hits.len(), "Query hits");

        hits.hits.iter().map(|hit| hydrate(query, hit)).collect()
    }

    /// First record matching `query`, if any.
    ///
    /// The request asks for a single row starting at zero. When the index
    /// reports no matches nothing is hydrated.
    pub async fn read_one(&self, query: &Query) -> Result<Option<Resource>> {
        let request = SolrTranslator::build_single_request(query);
        let hits: SearchHits = self
            .with_connection("read_one", move |conn| {
                Box::pin(async move { conn.query(&request).await })
            })
            .await?;

        metrics::record_hits("read_one", hits.total);
        if hits.total == 0 {
            debug!(model = %query.model().name(), "No match");
            return Ok(None);
        }

        match hits.hits.first() {
            Some(hit) => hydrate(query, hit).map(Some),
            None => Ok(None),
        }
    }

    /// Apply `attributes` to every record `query` selects and resubmit them.
    ///
    /// The index replaces documents wholesale, so matching records are read
    /// back with every model field before the attributes are applied. Without
    /// a limit on `query` every match is updated, read in pages of
    /// [`UPDATE_PAGE_ROWS`]; with one, only that window is.
    pub async fn update(
        &self,
        attributes: &[(&str, FieldValue)],
        query: &Query,
    ) -> Result<Vec<WriteOutcome>> {
        // names and value types are checked before any connection is opened
        let mut scratch = Resource::new(query.model().clone());
        for (name, value) in attributes {
            scratch.set(name, value.clone())?;
        }

        let query = query.with_all_fields();
        let base = SolrTranslator::build_request(&query, RequestOptions::default());
        let hits: Vec<Hit> = self
            .with_connection("update", move |conn| {
                Box::pin(async move {
                    let offset = base.options.start.unwrap_or(0);
                    let windowed = base.options.rows.is_some();
                    let mut hits = Vec::new();

                    loop {
                        let mut request = base.clone();
                        request.options.start = Some(offset + hits.len());
                        if !windowed {
                            request.options.rows = Some(UPDATE_PAGE_ROWS);
                        }

                        let page = conn.query(&request).await?;
                        let received = page.hits.len();
                        hits.extend(page.hits);

                        let seen = (offset + hits.len()) as u64;
                        if windowed || received == 0 || seen >= page.total {
                            break;
                        }
                    }
                    Ok::<_, ClientError>(hits)
                })
            })
            .await?;

        debug!(matched = hits.len(), "Records selected for update");
        let mut records = hits
            .iter()
            .map(|hit| hydrate(&query, hit))
            .collect::<Result<Vec<_>>>()?;
        for record in &mut records {
            for (name, value) in attributes {
                record.set(name, value.clone())?;
            }
        }

        let documents: Vec<Document> = records
            .iter()
            .map(|record| DocumentMapper::to_document(record, false))
            .collect();
        self.write_documents("update", documents).await
    }

    /// Delete every document `query` matches.
    ///
    /// Only the query string is sent; paging and sort do not apply.
    pub async fn delete(&self, query: &Query) -> Result<()> {
        let q = SolrTranslator::build_request(query, RequestOptions::default()).query_string();
        let autocommit = self.config().autocommit;
        info!(query = %q, "Deleting by query");

        self.with_connection("delete", move |conn| {
            Box::pin(async move {
                conn.delete_by_query(&q).await?;
                if autocommit {
                    conn.commit().await?;
                }
                Ok::<_, ClientError>(())
            })
        })
        .await
    }

    /// Make pending writes visible.
    pub async fn commit(&self) -> Result<()> {
        self.with_connection("commit", |conn| Box::pin(async move { conn.commit().await }))
            .await
    }

    async fn write_documents(
        &self,
        operation: &'static str,
        documents: Vec<Document>,
    ) -> Result<Vec<WriteOutcome>> {
        if documents.is_empty() {
            debug!(operation, "Nothing to write");
            return Ok(Vec::new());
        }

        let autocommit = self.config().autocommit;
        let outcomes: Vec<WriteOutcome> = self
            .with_connection(operation, move |conn| {
                Box::pin(async move {
                    let outcomes = conn.add(&documents).await?;
                    if autocommit && outcomes.iter().any(WriteOutcome::is_indexed) {
                        conn.commit().await?;
                    }
                    Ok::<_, ClientError>(outcomes)
                })
            })
            .await?;

        let indexed = outcomes.iter().filter(|o| o.is_indexed()).count();
        let rejected = outcomes.len() - indexed;
        metrics::record_write_outcomes(indexed, rejected);

        if rejected > 0 {
            warn!(operation, indexed, rejected, "Some documents were rejected");
        } else {
            info!(operation, indexed, "Documents indexed");
        }
        Ok(outcomes)
    }
}

fn hydrate(query: &Query, hit: &Hit) -> Result<Resource> {
    let values = SolrTranslator::hydrate(hit, query.fields())?;
    Ok(Resource::load(query.model().clone(), query.fields(), values))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AdapterConfig;
    use crate::error::AdapterError;
    use crate::model::{FieldDescriptor, FieldType, ModelSchema, SchemaError};
    use crate::search::{Direction, QueryBuilder};
    use crate::storage::MemoryIndex;

    fn book() -> Arc<ModelSchema> {
        Arc::new(
            ModelSchema::new(
                "Book",
                vec![
                    FieldDescriptor::new("id", FieldType::Text),
                    FieldDescriptor::new("title", FieldType::Text),
                    FieldDescriptor::new("price", FieldType::Integer),
                ],
            )
            .unwrap(),
        )
    }

    fn record(model: &Arc<ModelSchema>, id: &str, title: &str, price: i64) -> Resource {
        Resource::new(model.clone())
            .with("id", id)
            .unwrap()
            .with("title", title)
            .unwrap()
            .with("price", price)
            .unwrap()
    }

    async fn seeded() -> (SearchAdapter<MemoryIndex>, Arc<ModelSchema>) {
        let model = book();
        let adapter = SearchAdapter::new(MemoryIndex::default(), AdapterConfig::default());
        adapter
            .create(&[
                record(&model, "b1", "Dune", 12),
                record(&model, "b2", "Emma", 8),
                record(&model, "b3", "Ulysses", 20),
            ])
            .await
            .unwrap();
        (adapter, model)
    }

    #[tokio::test]
    async fn test_create_and_read_many() {
        let (adapter, model) = seeded().await;
        let query = QueryBuilder::new(model)
            .gte("price", 10)
            .order("price", Direction::Desc)
            .build()
            .unwrap();

        let found = adapter.read_many(&query).await.unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.get("id").unwrap().to_string()).collect();
        assert_eq!(ids, vec!["b3", "b1"]);
        assert!(!found[0].is_changed());
    }

    #[tokio::test]
    async fn test_read_many_with_extra_rows() {
        let (adapter, model) = seeded().await;
        let query = Query::all(model);
        let found = adapter
            .read_many_with(&query, RequestOptions::default().with_rows(2))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_read_one_none_and_some() {
        let (adapter, model) = seeded().await;

        let missing = QueryBuilder::new(model.clone()).eql("title", "Nope").build().unwrap();
        assert!(adapter.read_one(&missing).await.unwrap().is_none());

        let query = QueryBuilder::new(model).eql("title", "Emma").build().unwrap();
        let found = adapter.read_one(&query).await.unwrap().unwrap();
        assert_eq!(found.get("price"), Some(&FieldValue::Integer(8)));
    }

    #[tokio::test]
    async fn test_update_rewrites_full_documents() {
        let (adapter, model) = seeded().await;
        let query = QueryBuilder::new(model.clone())
            .eql("id", "b2")
            .fields(["price"])
            .build()
            .unwrap();

        let outcomes = adapter
            .update(&[("price", FieldValue::Integer(9))], &query)
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);

        let stored = adapter.factory().get("b2").unwrap();
        assert_eq!(stored.get("price"), Some(&FieldValue::Integer(9)));
        assert_eq!(stored.get("title"), Some(&FieldValue::text("Emma")));
    }

    #[tokio::test]
    async fn test_update_unknown_attribute_fails_before_reading() {
        let (adapter, model) = seeded().await;
        let opened = adapter.factory().connections_opened();
        let err = adapter
            .update(&[("author", FieldValue::text("x"))], &Query::all(model))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Schema(_)));
        assert_eq!(adapter.factory().connections_opened(), opened);
    }

    #[tokio::test]
    async fn test_update_mismatched_attribute_fails_before_reading() {
        let (adapter, model) = seeded().await;
        let opened = adapter.factory().connections_opened();
        let err = adapter
            .update(&[("price", FieldValue::text("cheap"))], &Query::all(model))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Schema(SchemaError::TypeMismatch { .. })));
        assert_eq!(adapter.factory().connections_opened(), opened);
    }

    #[tokio::test]
    async fn test_update_reaches_past_default_page() {
        let model = book();
        let adapter = SearchAdapter::new(MemoryIndex::default(), AdapterConfig::default());
        let records: Vec<Resource> = (0..15)
            .map(|i| record(&model, &format!("b{i:02}"), "Same", 1))
            .collect();
        adapter.create(&records).await.unwrap();

        let query = QueryBuilder::new(model.clone()).eql("price", 1).build().unwrap();
        let outcomes = adapter
            .update(&[("price", FieldValue::Integer(2))], &query)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 15);
        let remaining = adapter
            .read_many_with(&query, RequestOptions::default().with_rows(100))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_update_with_limit_touches_only_window() {
        let (adapter, model) = seeded().await;
        let query = QueryBuilder::new(model.clone())
            .order("price", Direction::Asc)
            .limit(1)
            .build()
            .unwrap();

        let outcomes = adapter
            .update(&[("title", FieldValue::text("Cheapest"))], &query)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id(), Some("b2"));
        assert_eq!(
            adapter.factory().get("b1").unwrap().get("title"),
            Some(&FieldValue::text("Dune"))
        );
    }

    #[tokio::test]
    async fn test_delete_by_query() {
        let (adapter, model) = seeded().await;
        let query = QueryBuilder::new(model.clone()).lt("price", 10).build().unwrap();
        adapter.delete(&query).await.unwrap();

        assert_eq!(adapter.factory().len(), 2);
        assert!(adapter.factory().get("b2").is_none());
    }

    #[tokio::test]
    async fn test_create_empty_opens_no_connection() {
        let adapter = SearchAdapter::new(MemoryIndex::default(), AdapterConfig::default());
        let outcomes = adapter.create::<Resource>(&[]).await.unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(adapter.factory().connections_opened(), 0);
    }

    #[tokio::test]
    async fn test_every_scope_releases_its_connection() {
        let (adapter, model) = seeded().await;
        adapter.read_many(&Query::all(model.clone())).await.unwrap();
        adapter.read_one(&Query::all(model)).await.unwrap();
        adapter.commit().await.unwrap();

        let index = adapter.factory();
        assert_eq!(index.connections_opened(), 4);
        assert_eq!(index.connections_released(), 4);
    }
}
