// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Field descriptors and type coercion.
//!
//! A [`FieldDescriptor`] is read-only metadata: the field's name, the key it is
//! stored under in the index, and its declared [`FieldType`]. The type owns the
//! coercion from raw hit strings back to typed values, and its inverse.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value::FieldValue;

/// Raw value could not be coerced into the declared field type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot coerce {raw:?} into {expected} for field '{field}'")]
pub struct CoercionError {
    pub field: String,
    pub expected: FieldType,
    pub raw: String,
}

/// Declared value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "datetime"),
        }
    }
}

impl FieldType {
    /// Coerce a raw wire string into a typed value.
    ///
    /// `None` in gives `None` out. An empty string is also absent for every
    /// type except `Text`.
    pub fn typecast(&self, field: &str, raw: Option<&str>) -> Result<Option<FieldValue>, CoercionError> {
        let Some(raw) = raw else {
            return Ok(None);
        };

        if raw.is_empty() && *self != Self::Text {
            return Ok(None);
        }

        let fail = || CoercionError {
            field: field.to_string(),
            expected: *self,
            raw: raw.to_string(),
        };

        let value = match self {
            Self::Text => FieldValue::Text(raw.to_string()),
            Self::Integer => FieldValue::Integer(raw.trim().parse().map_err(|_| fail())?),
            Self::Float => FieldValue::Float(raw.trim().parse().map_err(|_| fail())?),
            Self::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => FieldValue::Boolean(true),
                "false" | "f" | "0" => FieldValue::Boolean(false),
                _ => return Err(fail()),
            },
            Self::DateTime => FieldValue::DateTime(parse_datetime(raw.trim()).ok_or_else(fail)?),
            Self::Date => FieldValue::Date(parse_date(raw.trim()).ok_or_else(fail)?),
        };

        Ok(Some(value))
    }

    /// Inverse of [`typecast`](Self::typecast): the value as it goes on the wire.
    #[must_use]
    pub fn dump(&self, value: &FieldValue) -> FieldValue {
        value.to_wire()
    }

    /// Bring a value assigned to a field of this type into the variant
    /// [`typecast`](Self::typecast) produces for it.
    ///
    /// Integers widen to floats, dates and datetimes convert into each other,
    /// and text is parsed as a raw hit value would be. `None` when the value
    /// cannot represent this type.
    #[must_use]
    pub fn conform(&self, value: FieldValue) -> Option<FieldValue> {
        match (*self, value) {
            (Self::Text, v @ FieldValue::Text(_))
            | (Self::Integer, v @ FieldValue::Integer(_))
            | (Self::Float, v @ FieldValue::Float(_))
            | (Self::Boolean, v @ FieldValue::Boolean(_))
            | (Self::Date, v @ FieldValue::Date(_))
            | (Self::DateTime, v @ FieldValue::DateTime(_)) => Some(v),
            (Self::Float, FieldValue::Integer(n)) => Some(FieldValue::Float(n as f64)),
            (Self::Date, FieldValue::DateTime(dt)) => Some(FieldValue::Date(dt.date_naive())),
            (Self::DateTime, FieldValue::Date(d)) => d
                .and_hms_opt(0, 0, 0)
                .map(|naive| FieldValue::DateTime(naive.and_utc())),
            (ty, FieldValue::Text(raw)) => ty.typecast("", Some(&raw)).ok().flatten(),
            _ => None,
        }
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date_naive()))
}

/// Metadata for one declared field of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name on the record
    pub name: String,
    /// Key the value is stored under in the index
    pub field: String,
    /// Declared value type
    pub field_type: FieldType,
    /// Part of the record's identity
    #[serde(default)]
    pub key: bool,
}

impl FieldDescriptor {
    /// Create a descriptor stored under its own name
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            field: name.clone(),
            name,
            field_type,
            key: false,
        }
    }

    /// Store the field under a different index key
    #[must_use]
    pub fn stored_as(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Mark as identity field
    #[must_use]
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Run this field's coercion on a raw hit value
    pub fn typecast(&self, raw: Option<&str>) -> Result<Option<FieldValue>, CoercionError> {
        self.field_type.typecast(&self.name, raw)
    }

    /// Wire representation of a value of this field
    #[must_use]
    pub fn dump(&self, value: &FieldValue) -> FieldValue {
        self.field_type.dump(value)
    }
}
