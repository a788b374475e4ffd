//! Integration Tests for the Search Adapter
//!
//! End-to-end runs of [`SearchAdapter`] over the in-process [`MemoryIndex`]:
//! records go in through the document mapper, come back through the
//! translator, and are hydrated into typed values.
//!
//! # Running Tests
//! ```bash
//! cargo test --test integration
//!
//! # Only happy-path tests
//! cargo test --test integration happy
//! ```
//!
//! # Test Organization
//! - `happy_*` - Normal operation: create, query, update, delete
//! - `failure_*` - Rejections and invalid input

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use search_adapter::model::{FieldDescriptor, FieldType, FieldValue, ModelSchema, Resource};
use search_adapter::search::{Direction, Document, Query, QueryBuilder, RequestOptions};
use search_adapter::storage::{ConnectionFactory, MemoryIndex, SearchConnection};
use search_adapter::{AdapterConfig, AdapterError, SearchAdapter, WriteOutcome};

// =============================================================================
// Fixtures
// =============================================================================

fn book() -> Arc<ModelSchema> {
    Arc::new(
        ModelSchema::new(
            "Book",
            vec![
                FieldDescriptor::new("id", FieldType::Text),
                FieldDescriptor::new("title", FieldType::Text),
                FieldDescriptor::new("price", FieldType::Integer),
                FieldDescriptor::new("rating", FieldType::Float),
                FieldDescriptor::new("in_print", FieldType::Boolean),
                FieldDescriptor::new("published", FieldType::Date),
                FieldDescriptor::new("indexed_at", FieldType::DateTime),
            ],
        )
        .unwrap(),
    )
}

fn author() -> Arc<ModelSchema> {
    Arc::new(
        ModelSchema::new(
            "Author",
            vec![
                FieldDescriptor::new("id", FieldType::Text),
                FieldDescriptor::new("name", FieldType::Text),
            ],
        )
        .unwrap(),
    )
}

fn book_record(model: &Arc<ModelSchema>, id: &str, title: &str, price: i64) -> Resource {
    Resource::new(model.clone())
        .with("id", id)
        .unwrap()
        .with("title", title)
        .unwrap()
        .with("price", price)
        .unwrap()
}

fn adapter() -> SearchAdapter<MemoryIndex> {
    SearchAdapter::new(MemoryIndex::default(), AdapterConfig::default())
}

async fn seed_library(adapter: &SearchAdapter<MemoryIndex>, model: &Arc<ModelSchema>) {
    let outcomes = adapter
        .create(&[
            book_record(model, "b1", "Dune", 12),
            book_record(model, "b2", "Emma", 8),
            book_record(model, "b3", "Jonathan Strange", 25),
            book_record(model, "b4", "Jane Eyre", 10),
            book_record(model, "b5", "Ulysses", 30),
        ])
        .await
        .unwrap();
    assert!(outcomes.iter().all(WriteOutcome::is_indexed));
}

fn ids(records: &[Resource]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.get("id").map(ToString::to_string).unwrap_or_default())
        .collect()
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn happy_create_then_read_all_fields_typed() {
    let model = book();
    let adapter = adapter();

    let indexed_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
    let record = book_record(&model, "b1", "Dune", 12)
        .with("rating", 4.5)
        .unwrap()
        .with("in_print", true)
        .unwrap()
        .with("published", NaiveDate::from_ymd_opt(1965, 8, 1).unwrap())
        .unwrap()
        .with("indexed_at", indexed_at)
        .unwrap();

    adapter.create(&[record]).await.unwrap();

    let found = adapter
        .read_one(&QueryBuilder::new(model).eql("id", "b1").build().unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.get("title"), Some(&FieldValue::text("Dune")));
    assert_eq!(found.get("price"), Some(&FieldValue::Integer(12)));
    assert_eq!(found.get("rating"), Some(&FieldValue::Float(4.5)));
    assert_eq!(found.get("in_print"), Some(&FieldValue::Boolean(true)));
    assert_eq!(
        found.get("published"),
        Some(&FieldValue::Date(NaiveDate::from_ymd_opt(1965, 8, 1).unwrap()))
    );
    assert_eq!(found.get("indexed_at"), Some(&FieldValue::DateTime(indexed_at)));
    assert!(!found.is_changed());
}

#[tokio::test]
async fn happy_conditions_sort_and_paging() {
    let model = book();
    let adapter = adapter();
    seed_library(&adapter, &model).await;

    let query = QueryBuilder::new(model.clone())
        .gte("price", 10)
        .not("title", "Ulysses")
        .order("price", Direction::Asc)
        .build()
        .unwrap();
    assert_eq!(ids(&adapter.read_many(&query).await.unwrap()), vec!["b4", "b1", "b3"]);

    let paged = QueryBuilder::new(model)
        .order("price", Direction::Desc)
        .limit(2)
        .offset(1)
        .build()
        .unwrap();
    assert_eq!(ids(&adapter.read_many(&paged).await.unwrap()), vec!["b3", "b1"]);
}

#[tokio::test]
async fn happy_like_and_membership() {
    let model = book();
    let adapter = adapter();
    seed_library(&adapter, &model).await;

    let like = QueryBuilder::new(model.clone())
        .like("title", "J%e")
        .build()
        .unwrap();
    assert_eq!(ids(&adapter.read_many(&like).await.unwrap()), vec!["b3", "b4"]);

    let members = QueryBuilder::new(model)
        .any_of("id", ["b2", "b5", "missing"])
        .build()
        .unwrap();
    assert_eq!(ids(&adapter.read_many(&members).await.unwrap()), vec!["b2", "b5"]);
}

#[tokio::test]
async fn happy_query_options_override_extra_options() {
    let model = book();
    let adapter = adapter();
    seed_library(&adapter, &model).await;

    let query = QueryBuilder::new(model)
        .order("price", Direction::Asc)
        .limit(1)
        .build()
        .unwrap();
    let extra = RequestOptions::default().with_rows(4).with_start(2);

    let found = adapter.read_many_with(&query, extra).await.unwrap();
    // rows comes from the query, start from the extra options
    assert_eq!(ids(&found), vec!["b1"]);
}

#[tokio::test]
async fn happy_type_filter_isolates_models() {
    let books = book();
    let authors = author();
    let adapter = adapter();
    seed_library(&adapter, &books).await;

    let herbert = Resource::new(authors.clone())
        .with("id", "a1")
        .unwrap()
        .with("name", "Frank Herbert")
        .unwrap();
    adapter.create(&[herbert]).await.unwrap();

    let all_authors = adapter.read_many(&Query::all(authors)).await.unwrap();
    assert_eq!(ids(&all_authors), vec!["a1"]);

    let all_books = adapter
        .read_many_with(&Query::all(books), RequestOptions::default().with_rows(100))
        .await
        .unwrap();
    assert_eq!(all_books.len(), 5);
}

#[tokio::test]
async fn happy_read_one_without_match_is_none() {
    let model = book();
    let adapter = adapter();
    seed_library(&adapter, &model).await;

    let query = QueryBuilder::new(model).gt("price", 1000).build().unwrap();
    assert!(adapter.read_one(&query).await.unwrap().is_none());
}

#[tokio::test]
async fn happy_update_applies_attributes_to_matches() {
    let model = book();
    let adapter = adapter();
    seed_library(&adapter, &model).await;

    let cheap = QueryBuilder::new(model.clone()).lte("price", 10).build().unwrap();
    let outcomes = adapter
        .update(&[("in_print", FieldValue::Boolean(false))], &cheap)
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(WriteOutcome::is_indexed));

    let out_of_print = QueryBuilder::new(model)
        .eql("in_print", false)
        .build()
        .unwrap();
    assert_eq!(ids(&adapter.read_many(&out_of_print).await.unwrap()), vec!["b2", "b4"]);

    // untouched fields survive the wholesale replace
    let emma = adapter.factory().get("b2").unwrap();
    assert_eq!(emma.get("title"), Some(&FieldValue::text("Emma")));
}

#[tokio::test]
async fn happy_update_without_limit_covers_every_page() {
    let model = book();
    let adapter = adapter();

    let records: Vec<Resource> = (0..150)
        .map(|i| book_record(&model, &format!("b{i:03}"), "Reprint", 1))
        .collect();
    adapter.create(&records).await.unwrap();

    let at_one = QueryBuilder::new(model.clone()).eql("price", 1).build().unwrap();
    let outcomes = adapter
        .update(&[("price", FieldValue::Integer(2))], &at_one)
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 150);
    assert!(outcomes.iter().all(WriteOutcome::is_indexed));

    let everything = RequestOptions::default().with_rows(500);
    assert!(adapter.read_many_with(&at_one, everything.clone()).await.unwrap().is_empty());
    let at_two = QueryBuilder::new(model).eql("price", 2).build().unwrap();
    assert_eq!(adapter.read_many_with(&at_two, everything).await.unwrap().len(), 150);
}

#[tokio::test]
async fn happy_float_field_set_from_integer_round_trips() {
    let model = book();
    let adapter = adapter();

    let record = book_record(&model, "b1", "Dune", 12).with("rating", 4).unwrap();
    assert_eq!(record.get("rating"), Some(&FieldValue::Float(4.0)));
    adapter.create(&[record.clone()]).await.unwrap();

    let found = adapter
        .read_one(&QueryBuilder::new(model).eql("id", "b1").build().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get("rating"), record.get("rating"));
}

#[tokio::test]
async fn happy_delete_by_query() {
    let model = book();
    let adapter = adapter();
    seed_library(&adapter, &model).await;

    let expensive = QueryBuilder::new(model.clone())
        .gt("price", 20)
        .limit(1)
        .build()
        .unwrap();
    adapter.delete(&expensive).await.unwrap();

    // paging does not narrow a delete
    let left = adapter.read_many(&Query::all(model)).await.unwrap();
    assert_eq!(ids(&left), vec!["b1", "b2", "b4"]);
}

#[tokio::test]
async fn happy_manual_commit_when_autocommit_off() {
    let model = book();
    let config = AdapterConfig {
        autocommit: false,
        ..Default::default()
    };
    let adapter = SearchAdapter::new(MemoryIndex::default(), config);

    adapter
        .create(&[book_record(&model, "b1", "Dune", 12)])
        .await
        .unwrap();
    assert!(adapter.read_many(&Query::all(model.clone())).await.unwrap().is_empty());
    assert_eq!(adapter.factory().pending(), 1);

    adapter.commit().await.unwrap();
    assert_eq!(adapter.read_many(&Query::all(model)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn happy_stored_document_omits_unset_and_formats_datetime() {
    let model = Arc::new(
        ModelSchema::new(
            "Article",
            vec![
                FieldDescriptor::new("id", FieldType::Text),
                FieldDescriptor::new("summary", FieldType::Text),
                FieldDescriptor::new("date", FieldType::DateTime),
            ],
        )
        .unwrap(),
    );
    let adapter = adapter();

    let date = Utc.with_ymd_and_hms(2008, 8, 13, 9, 54, 0).unwrap();
    let article = Resource::new(model)
        .with("id", "a1")
        .unwrap()
        .with("date", date)
        .unwrap();
    adapter.create(&[article]).await.unwrap();

    let stored: Document = adapter.factory().get("a1").unwrap();
    assert!(!stored.contains_key("summary"));
    assert_eq!(stored.type_name(), Some("article"));
    assert_eq!(stored.get("date").unwrap().to_string(), "2008-08-13T09:54:00Z");
}

// =============================================================================
// Failure Scenarios
// =============================================================================

#[tokio::test]
async fn failure_document_without_unique_key_rejected_alone() {
    let model = book();
    let adapter = adapter();

    let keyless = Resource::new(model.clone()).with("title", "Anonymous").unwrap();
    let outcomes = adapter
        .create(&[book_record(&model, "b1", "Dune", 12), keyless])
        .await
        .unwrap();

    assert!(outcomes[0].is_indexed());
    assert_eq!(outcomes[0].id(), Some("b1"));
    assert!(matches!(outcomes[1], WriteOutcome::Rejected { id: None, .. }));
    assert_eq!(adapter.factory().len(), 1);
}

#[test]
fn failure_unknown_field_in_query() {
    let err = QueryBuilder::new(book()).eql("isbn", "x").build().unwrap_err();
    assert!(AdapterError::from(err).to_string().contains("isbn"));
}

#[test]
fn failure_value_of_wrong_type_rejected_on_set() {
    let err = book_record(&book(), "b1", "Dune", 12)
        .with("price", "cheap")
        .unwrap_err();
    assert!(AdapterError::from(err).to_string().contains("price"));
}

#[tokio::test]
async fn failure_garbage_in_index_surfaces_coercion_error() {
    let model = book();
    let adapter = adapter();

    let mut document = Document::new();
    document.insert("type", FieldValue::text("book"));
    document.insert("id", FieldValue::text("b1"));
    document.insert("price", FieldValue::text("twelve"));

    let conn = adapter.factory().connect().await.unwrap();
    conn.add(&[document]).await.unwrap();
    conn.commit().await.unwrap();
    drop(conn);

    let err = adapter.read_many(&Query::all(model)).await.unwrap_err();
    assert!(matches!(err, AdapterError::Coercion(_)));
    assert_eq!(
        adapter.factory().connections_opened(),
        adapter.factory().connections_released()
    );
}
