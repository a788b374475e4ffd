// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Typed field values.
//!
//! [`FieldValue`] is what records hold and what conditions compare against.
//! Its `Display` form is the wire form used both in query fragments and in
//! indexed documents.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

/// Wire format for dates and datetimes: UTC, second precision, trailing `Z`.
pub const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Calendar date (indexed as midnight UTC)
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Sequence of values (membership conditions, multi-valued fields)
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create a list value
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Short name of the variant, for error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
        }
    }

    /// Normalize for indexing.
    ///
    /// Dates and datetimes become their wire string; every other value is
    /// returned unchanged.
    #[must_use]
    pub fn to_wire(&self) -> FieldValue {
        match self {
            Self::Date(_) | Self::DateTime(_) => Self::Text(self.to_string()),
            other => other.clone(),
        }
    }

    /// Render list members space-separated, the way membership fragments
    /// and sequence-valued equality expect them.
    #[must_use]
    pub fn join_terms(values: &[FieldValue]) -> String {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT00:00:00Z")),
            Self::DateTime(dt) => write!(f, "{}", dt.format(WIRE_DATETIME_FORMAT)),
            Self::List(values) => write!(f, "({})", Self::join_terms(values)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Date(_) | Self::DateTime(_) => serializer.collect_str(self),
            Self::List(values) => serializer.collect_seq(values),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<V: Into<FieldValue>> From<Vec<V>> for FieldValue {
    fn from(values: Vec<V>) -> Self {
        Self::list(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_scalars() {
        assert_eq!(FieldValue::from(10).to_string(), "10");
        assert_eq!(FieldValue::from(10.5).to_string(), "10.5");
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::text("J*n").to_string(), "J*n");
    }

    #[test]
    fn test_display_datetime_is_utc_seconds_with_z() {
        let dt = Utc.with_ymd_and_hms(2008, 8, 13, 9, 54, 0).unwrap();
        assert_eq!(FieldValue::DateTime(dt).to_string(), "2008-08-13T09:54:00Z");
    }

    #[test]
    fn test_display_date_is_midnight() {
        let d = NaiveDate::from_ymd_opt(2008, 8, 13).unwrap();
        assert_eq!(FieldValue::Date(d).to_string(), "2008-08-13T00:00:00Z");
    }

    #[test]
    fn test_display_list() {
        let value = FieldValue::list(["a", "b"]);
        assert_eq!(value.to_string(), "(a b)");
    }

    #[test]
    fn test_to_wire_only_touches_dates() {
        let dt = Utc.with_ymd_and_hms(2008, 8, 13, 9, 54, 0).unwrap();
        assert_eq!(
            FieldValue::DateTime(dt).to_wire(),
            FieldValue::text("2008-08-13T09:54:00Z")
        );
        assert_eq!(FieldValue::from(42).to_wire(), FieldValue::from(42));
        assert_eq!(FieldValue::text("x").to_wire(), FieldValue::text("x"));
    }

    #[test]
    fn test_serialize_json() {
        let value = FieldValue::list(vec![FieldValue::from(1), FieldValue::text("two")]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[1,"two"]"#);

        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let json = serde_json::to_string(&FieldValue::DateTime(dt)).unwrap();
        assert_eq!(json, r#""2020-01-02T03:04:05Z""#);
    }
}
