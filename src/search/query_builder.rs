// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - abstract queries over a model
//!
//! A [`Query`] targets one model and carries an ordered list of conditions,
//! ordered sort terms, and optional limit/offset. Conditions are validated when
//! they are built, so translation itself cannot fail.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use search_adapter::model::{FieldDescriptor, FieldType, ModelSchema};
//! use search_adapter::search::{Direction, QueryBuilder};
//!
//! let book = Arc::new(ModelSchema::new("Book", vec![
//!     FieldDescriptor::new("title", FieldType::Text),
//!     FieldDescriptor::new("price", FieldType::Integer),
//! ]).unwrap());
//!
//! let query = QueryBuilder::new(book)
//!     .gte("price", 10)
//!     .like("title", "J%n")
//!     .order("price", Direction::Desc)
//!     .limit(20)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(query.conditions().len(), 2);
//! ```

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{FieldDescriptor, FieldValue, ModelSchema, SchemaError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("unsupported condition operator '{0}'")]
    UnsupportedOperator(String),
    #[error("invalid value for {operator} on '{field}': {reason}")]
    InvalidValue {
        operator: Operator,
        field: String,
        reason: String,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Condition operator.
///
/// The set is closed: the translator matches on it exhaustively, so adding a
/// variant forces a translation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Equals (a list value matches any member)
    Eql,
    /// Not equals
    Not,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Member of a set
    In,
    /// Pattern match, `%` is the wildcard
    Like,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Self::Eql,
        Self::Not,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::Like,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eql => "eql",
            Self::Not => "not",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Like => "like",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::UnsupportedOperator(s.to_string()))
    }
}

/// One predicate: operator, field, value.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    operator: Operator,
    field: Arc<FieldDescriptor>,
    value: FieldValue,
}

impl Condition {
    /// Build a condition, checking the value shape the operator needs.
    pub fn new(
        operator: Operator,
        field: Arc<FieldDescriptor>,
        value: FieldValue,
    ) -> Result<Self, QueryError> {
        let invalid = |reason: &str| QueryError::InvalidValue {
            operator,
            field: field.name.clone(),
            reason: reason.to_string(),
        };

        match (operator, &value) {
            (Operator::Eql | Operator::Not, _) => {}
            (Operator::In, FieldValue::List(values)) if !values.is_empty() => {}
            (Operator::In, FieldValue::List(_)) => return Err(invalid("empty set")),
            (Operator::In, other) => {
                return Err(invalid(&format!("expected a list, got {}", other.kind())))
            }
            (Operator::Like, FieldValue::Text(_)) => {}
            (Operator::Like, other) => {
                return Err(invalid(&format!("expected a text pattern, got {}", other.kind())))
            }
            (Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte, FieldValue::List(_)) => {
                return Err(invalid("range bounds must be scalar"))
            }
            (Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte, _) => {}
        }

        Ok(Self {
            operator,
            field,
            value,
        })
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One ordering term
#[derive(Debug, Clone, PartialEq)]
pub struct SortTerm {
    pub field: Arc<FieldDescriptor>,
    pub direction: Direction,
}

/// Abstract query against one model.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    model: Arc<ModelSchema>,
    fields: Vec<Arc<FieldDescriptor>>,
    conditions: Vec<Condition>,
    order: Vec<SortTerm>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    /// Query matching every record of the model
    pub fn all(model: Arc<ModelSchema>) -> Self {
        Self {
            fields: model.fields().to_vec(),
            model,
            conditions: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    #[must_use]
    pub fn model(&self) -> &Arc<ModelSchema> {
        &self.model
    }

    /// Fields to hydrate, in result order
    #[must_use]
    pub fn fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.fields
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn order(&self) -> &[SortTerm] {
        &self.order
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Same query, hydrating every model field
    #[must_use]
    pub fn with_all_fields(&self) -> Self {
        Self {
            fields: self.model.fields().to_vec(),
            ..self.clone()
        }
    }
}

/// Builder for [`Query`].
///
/// Field names are resolved against the model in [`build`](Self::build); the
/// first unknown field or invalid condition is returned there.
pub struct QueryBuilder {
    model: Arc<ModelSchema>,
    fields: Option<Vec<String>>,
    conditions: Vec<(Operator, String, FieldValue)>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl QueryBuilder {
    /// Start a query for a model
    pub fn new(model: Arc<ModelSchema>) -> Self {
        Self {
            model,
            fields: None,
            conditions: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add a condition with any operator
    pub fn condition(
        mut self,
        operator: Operator,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.conditions.push((operator, field.into(), value.into()));
        self
    }

    /// `field == value`
    pub fn eql(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(Operator::Eql, field, value)
    }

    /// `field != value`
    pub fn not(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(Operator::Not, field, value)
    }

    /// `field > value`
    pub fn gt(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(Operator::Gt, field, value)
    }

    /// `field >= value`
    pub fn gte(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(Operator::Gte, field, value)
    }

    /// `field < value`
    pub fn lt(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(Operator::Lt, field, value)
    }

    /// `field <= value`
    pub fn lte(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(Operator::Lte, field, value)
    }

    /// `field IN (values...)`
    pub fn any_of<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.condition(Operator::In, field, FieldValue::list(values))
    }

    /// `field LIKE pattern` (`%` wildcard)
    pub fn like(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.condition(Operator::Like, field, FieldValue::Text(pattern.into()))
    }

    /// Append a sort term
    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push((field.into(), direction));
        self
    }

    /// Restrict and order the fields to hydrate
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Resolve fields and validate conditions
    pub fn build(self) -> Result<Query, QueryError> {
        let model = self.model;

        let fields = match self.fields {
            Some(names) => names
                .iter()
                .map(|name| model.require(name).cloned())
                .collect::<Result<Vec<_>, _>>()?,
            None => model.fields().to_vec(),
        };

        let conditions = self
            .conditions
            .into_iter()
            .map(|(operator, name, value)| {
                let field = model.require(&name)?.clone();
                Condition::new(operator, field, value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order = self
            .order
            .into_iter()
            .map(|(name, direction)| {
                Ok(SortTerm {
                    field: model.require(&name)?.clone(),
                    direction,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        Ok(Query {
            model,
            fields,
            conditions,
            order,
            limit: self.limit,
            offset: self.offset,
        })
    }
}
