// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Records and dirty tracking.
//!
//! [`Record`] is the read-only view the document mapper needs. [`Resource`]
//! is the concrete record this crate hands back from reads: a schema, the
//! current values, and the set of fields changed since it was last loaded or
//! persisted.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::field::FieldDescriptor;
use super::schema::{ModelSchema, SchemaError};
use super::value::FieldValue;

/// A record of some logical type.
pub trait Record {
    /// Schema of the record's logical type
    fn schema(&self) -> &ModelSchema;

    /// Current value of a field; `None` when unset
    fn value(&self, field: &str) -> Option<&FieldValue>;

    /// Whether the field changed since the record was last synchronized
    fn is_dirty(&self, field: &str) -> bool;
}

/// A record with dirty tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    schema: Arc<ModelSchema>,
    values: BTreeMap<String, FieldValue>,
    dirty: BTreeSet<String>,
}

impl Resource {
    /// Create an empty record
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Reconstruct a clean record from hydrated values.
    ///
    /// `values` lines up with `fields` by position; absent values stay unset.
    pub fn load(
        schema: Arc<ModelSchema>,
        fields: &[Arc<FieldDescriptor>],
        values: Vec<Option<FieldValue>>,
    ) -> Self {
        let values = fields
            .iter()
            .zip(values)
            .filter_map(|(field, value)| value.map(|v| (field.name.clone(), v)))
            .collect();

        Self {
            schema,
            values,
            dirty: BTreeSet::new(),
        }
    }

    /// Shared schema handle
    #[must_use]
    pub fn schema_arc(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// Set a field, marking it dirty.
    ///
    /// The value is conformed to the field's declared type (see
    /// [`FieldType::conform`](super::FieldType::conform)); one that cannot
    /// represent it is rejected and the record is left unchanged.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), SchemaError> {
        let descriptor = self.schema.require(field)?;
        let value = value.into();
        let found = value.kind();
        let value = descriptor
            .field_type
            .conform(value)
            .ok_or_else(|| SchemaError::TypeMismatch {
                model: self.schema.name().to_string(),
                field: descriptor.name.clone(),
                expected: descriptor.field_type,
                found,
            })?;

        let name = descriptor.name.clone();
        self.values.insert(name.clone(), value);
        self.dirty.insert(name);
        Ok(())
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Result<Self, SchemaError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Clear a field, marking it dirty
    pub fn unset(&mut self, field: &str) -> Result<(), SchemaError> {
        let name = self.schema.require(field)?.name.clone();
        self.values.remove(&name);
        self.dirty.insert(name);
        Ok(())
    }

    /// Current value of a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Fields changed since the last sync
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Whether any field changed since the last sync
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Forget pending changes (after a successful write)
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }
}

impl Record for Resource {
    fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    fn is_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }
}
