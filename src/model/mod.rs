// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Record model
//!
//! Typed values, field metadata, model schemas and records: the vocabulary the
//! document mapper and query translator work in.

mod field;
mod resource;
mod schema;
mod value;

pub use field::{CoercionError, FieldDescriptor, FieldType};
pub use resource::{Record, Resource};
pub use schema::{ModelSchema, SchemaError, DISCRIMINATOR_KEY};
pub use value::{FieldValue, WIRE_DATETIME_FORMAT};
