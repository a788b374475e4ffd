// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Document Mapper
//!
//! Flattens a record into the field map the index stores. Every document is
//! seeded with the discriminator `type → lowercase(model name)`; unset fields
//! are left out entirely and date values are written as
//! `YYYY-MM-DDTHH:MM:SSZ`.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{FieldValue, Record, DISCRIMINATOR_KEY};

/// Flat field map submitted for indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Empty document (no discriminator)
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Discriminator value, if present
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self.fields.get(DISCRIMINATOR_KEY) {
            Some(FieldValue::Text(name)) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<(String, FieldValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Converts records into documents.
pub struct DocumentMapper;

impl DocumentMapper {
    /// Map a record to a document.
    ///
    /// With `changed_only`, only fields the record reports dirty are included.
    /// The discriminator is always present.
    pub fn to_document<R: Record + ?Sized>(record: &R, changed_only: bool) -> Document {
        let schema = record.schema();

        let mut document = Document::new();
        document.insert(DISCRIMINATOR_KEY, FieldValue::Text(schema.type_name()));

        for field in schema.fields() {
            if changed_only && !record.is_dirty(&field.name) {
                continue;
            }
            if let Some(value) = record.value(&field.name) {
                document.insert(field.field.clone(), field.dump(value));
            }
        }

        document
    }
}
