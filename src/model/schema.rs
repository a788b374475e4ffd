// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Model schemas.
//!
//! A [`ModelSchema`] names a logical record type and lists its fields in
//! declaration order. Every document indexed for the model carries the
//! discriminator entry `type → lowercase(name)`, so no field may be stored
//! under that key.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use super::field::{FieldDescriptor, FieldType};

/// Reserved document key recording the logical type.
pub const DISCRIMINATOR_KEY: &str = "type";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("model name must not be empty")]
    EmptyName,
    #[error("field '{field}' of model '{model}' uses the reserved storage key '{key}'")]
    ReservedKey {
        model: String,
        field: String,
        key: String,
    },
    #[error("model '{model}' declares field '{field}' more than once")]
    DuplicateField { model: String, field: String },
    #[error("model '{model}' stores more than one field under key '{key}'")]
    DuplicateStorageKey { model: String, key: String },
    #[error("model '{model}' has no field named '{field}'")]
    UnknownField { model: String, field: String },
    #[error("field '{field}' of model '{model}' is {expected}, got {found} value")]
    TypeMismatch {
        model: String,
        field: String,
        expected: FieldType,
        found: &'static str,
    },
}

/// Logical record type with its declared fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<Arc<FieldDescriptor>>,
}

impl ModelSchema {
    /// Build and validate a schema.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for field in &fields {
            if field.field == DISCRIMINATOR_KEY {
                return Err(SchemaError::ReservedKey {
                    model: name,
                    field: field.name.clone(),
                    key: DISCRIMINATOR_KEY.to_string(),
                });
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    model: name,
                    field: field.name.clone(),
                });
            }
            if !keys.insert(field.field.as_str()) {
                return Err(SchemaError::DuplicateStorageKey {
                    model: name,
                    key: field.field.clone(),
                });
            }
        }

        Ok(Self {
            name,
            fields: fields.into_iter().map(Arc::new).collect(),
        })
    }

    /// Logical type name as declared
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discriminator value stored with every document of this model
    #[must_use]
    pub fn type_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.fields
    }

    /// Look up a field by record name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by record name, failing for undeclared names
    pub fn require(&self, name: &str) -> Result<&Arc<FieldDescriptor>, SchemaError> {
        self.field(name).ok_or_else(|| SchemaError::UnknownField {
            model: self.name.clone(),
            field: name.to_string(),
        })
    }

    /// Identity fields
    pub fn keys(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> {
        self.fields.iter().filter(|f| f.key)
    }
}
