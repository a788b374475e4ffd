// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query-string evaluation for the in-memory index.
//!
//! Understands the subset of Lucene syntax the translator emits:
//!
//! ```text
//! +field:term   -field:term   field:term
//! term with * wildcards
//! (t1 t2 ...)                 any of
//! [a TO b]  {a TO b}  * as an open end
//! ```
//!
//! Values compare numerically when both sides parse as numbers, otherwise
//! lexically (which orders the ISO date strings correctly).

use std::cmp::Ordering;

use super::traits::ClientError;
use crate::model::FieldValue;
use crate::search::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Occur {
    Must,
    MustNot,
    Should,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Bound {
    Open,
    Inclusive(String),
    Exclusive(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Term {
    Exact(String),
    Wildcard(String),
    AnyOf(Vec<Term>),
    Range { lower: Bound, upper: Bound },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Clause {
    pub occur: Occur,
    pub field: String,
    pub term: Term,
}

/// Parsed query: all clauses of a query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Matcher {
    clauses: Vec<Clause>,
}

impl Matcher {
    pub fn parse(query: &str) -> Result<Self, ClientError> {
        let malformed = |reason: String| ClientError::MalformedQuery {
            query: query.to_string(),
            reason,
        };

        let clauses = split_top_level(query)
            .map_err(malformed)?
            .into_iter()
            .map(|token| parse_clause(token).map_err(malformed))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clauses })
    }

    /// Whether the document satisfies every required and no prohibited clause.
    /// Optional clauses only matter when there are no required ones.
    pub fn matches(&self, doc: &Document) -> bool {
        let mut has_must = false;
        let mut any_should = None;

        for clause in &self.clauses {
            let hit = clause.term.matches_any(&values_of(doc, &clause.field));
            match clause.occur {
                Occur::Must => {
                    has_must = true;
                    if !hit {
                        return false;
                    }
                }
                Occur::MustNot => {
                    if hit {
                        return false;
                    }
                }
                Occur::Should => {
                    any_should = Some(any_should.unwrap_or(false) || hit);
                }
            }
        }

        has_must || any_should.unwrap_or(true)
    }

    #[cfg(test)]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl Term {
    fn matches_any(&self, values: &[String]) -> bool {
        values.iter().any(|v| self.matches(v))
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(term) => compare(value, term) == Ordering::Equal,
            Self::Wildcard(pattern) => wildcard_match(pattern, value),
            Self::AnyOf(terms) => terms.iter().any(|t| t.matches(value)),
            Self::Range { lower, upper } => {
                let above = match lower {
                    Bound::Open => true,
                    Bound::Inclusive(b) => compare(value, b) != Ordering::Less,
                    Bound::Exclusive(b) => compare(value, b) == Ordering::Greater,
                };
                let below = match upper {
                    Bound::Open => true,
                    Bound::Inclusive(b) => compare(value, b) != Ordering::Greater,
                    Bound::Exclusive(b) => compare(value, b) == Ordering::Less,
                };
                above && below
            }
        }
    }
}

/// Compare two wire strings, numerically when both are numbers
pub(crate) fn compare(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Wire strings of a document field; lists contribute every member
pub(crate) fn values_of(doc: &Document, field: &str) -> Vec<String> {
    match doc.get(field) {
        None => Vec::new(),
        Some(FieldValue::List(values)) => values.iter().map(ToString::to_string).collect(),
        Some(value) => vec![value.to_string()],
    }
}

fn split_top_level(query: &str) -> Result<Vec<&str>, String> {
    let mut tokens = Vec::new();
    let mut depth: i32 = 0;
    let mut start = None;

    for (i, c) in query.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(format!("unbalanced '{}' at {}", c, i));
                }
            }
            _ => {}
        }

        if c.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                tokens.push(&query[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if depth != 0 {
        return Err("unbalanced brackets".to_string());
    }
    if let Some(s) = start {
        tokens.push(&query[s..]);
    }
    Ok(tokens)
}

fn parse_clause(token: &str) -> Result<Clause, String> {
    let (occur, rest) = match token.as_bytes().first() {
        Some(b'+') => (Occur::Must, &token[1..]),
        Some(b'-') => (Occur::MustNot, &token[1..]),
        _ => (Occur::Should, token),
    };

    let (field, value) = rest
        .split_once(':')
        .ok_or_else(|| format!("'{}' is not a field clause", token))?;
    if field.is_empty() || value.is_empty() {
        return Err(format!("'{}' is missing a field or value", token));
    }

    Ok(Clause {
        occur,
        field: field.to_string(),
        term: parse_term(value)?,
    })
}

fn parse_term(value: &str) -> Result<Term, String> {
    if let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        let terms = inner.split_whitespace().map(simple_term).collect();
        return Ok(Term::AnyOf(terms));
    }

    let lower_inclusive = match value.as_bytes()[0] {
        b'[' => Some(true),
        b'{' => Some(false),
        _ => None,
    };
    let Some(lower_inclusive) = lower_inclusive else {
        return Ok(simple_term(value));
    };

    let upper_inclusive = match value.as_bytes()[value.len() - 1] {
        b']' => true,
        b'}' => false,
        _ => return Err(format!("unterminated range '{}'", value)),
    };

    let inner = &value[1..value.len() - 1];
    let (low, high) = inner
        .split_once(" TO ")
        .ok_or_else(|| format!("range '{}' needs 'TO'", value))?;

    Ok(Term::Range {
        lower: bound(low.trim(), lower_inclusive),
        upper: bound(high.trim(), upper_inclusive),
    })
}

fn simple_term(value: &str) -> Term {
    if value.contains('*') {
        Term::Wildcard(value.to_string())
    } else {
        Term::Exact(value.to_string())
    }
}

fn bound(value: &str, inclusive: bool) -> Bound {
    match (value, inclusive) {
        ("*", _) => Bound::Open,
        (v, true) => Bound::Inclusive(v.to_string()),
        (v, false) => Bound::Exclusive(v.to_string()),
    }
}

/// `*` matches any run of characters, everything else matches itself
fn wildcard_match(pattern: &str, value: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == value;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !value.starts_with(first) || value.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &value[first.len()..];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
