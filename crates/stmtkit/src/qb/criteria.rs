//! Map-style WHERE criteria.
//!
//! [`Criteria`] is an ordered list of `column -> value` filters. The key may
//! end with an operator:
//!
//! | key            | scalar          | `Null`            | list              |
//! |----------------|-----------------|-------------------|-------------------|
//! | `"col"`        | `col = :p`      | `col IS NULL`     | `col IN (...)`    |
//! | `"col !="`     | `col != :p`     | `col IS NOT NULL` | `col NOT IN (...)`|
//! | `"col in"`     | `col = :p`      | `col IS NULL`     | `col IN (...)`    |
//! | `"col not in"` | `col != :p`     | `col IS NOT NULL` | `col NOT IN (...)`|
//!
//! Every value is bound through
//! [`create_named_parameter`](super::QueryBuilder::create_named_parameter).
//! Empty lists produce no predicate.
//!
//! ```ignore
//! let criteria = Criteria::new()
//!     .with("u.status", "active")
//!     .with("u.deleted_at", None::<String>)
//!     .with_list("u.role not in", ["guest", "banned"]);
//! qb.where_criteria(criteria);
//! ```

use super::QueryBuilder;
use crate::client::Connection;
use crate::qb::expr::Predicate;
use crate::qb::param::Value;
use std::sync::OnceLock;

/// One criteria entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Compare a column with one value (`Null` tests for NULL).
    Scalar { key: String, value: Value },
    /// Test membership in a list of values.
    List { key: String, values: Vec<Value> },
    /// A predicate passed through as is.
    Predicate(Predicate),
}

/// Ordered map-style filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<Criterion>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `key` with `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push(Criterion::Scalar {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Test `key` against a list of values.
    pub fn with_list<I>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.entries.push(Criterion::List {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Pass a raw predicate or [`Expression`](super::Expression) through.
    pub fn with_predicate(mut self, predicate: impl Into<Predicate>) -> Self {
        self.entries.push(Criterion::Predicate(predicate.into()));
        self
    }

    pub fn entries(&self) -> &[Criterion] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Criteria::new(), |criteria, (key, value)| criteria.with(key, value))
    }
}

/// A criteria key split into its column and whether it negates.
#[derive(Debug, PartialEq, Eq)]
struct KeyOp<'a> {
    column: &'a str,
    negated: bool,
}

fn key_regex() -> &'static regex::Regex {
    static KEY_RE: OnceLock<regex::Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| {
        regex::Regex::new(
            r"(?i)^\s*(?P<column>.+?)(?:\s*(?P<cmp>!=|<>|=)|\s+(?P<set>not\s+in|in))?\s*$",
        )
        .expect("invalid built-in criteria key regex")
    })
}

fn parse_key(key: &str) -> KeyOp<'_> {
    let Some(caps) = key_regex().captures(key) else {
        return KeyOp {
            column: key.trim(),
            negated: false,
        };
    };

    let column = caps.name("column").map_or(key.trim(), |m| m.as_str());
    let negated = caps.name("cmp").is_some_and(|m| m.as_str() != "=")
        || caps
            .name("set")
            .is_some_and(|m| m.as_str().to_ascii_lowercase().starts_with("not"));
    KeyOp { column, negated }
}

impl<C: Connection> QueryBuilder<C> {
    /// Replace the WHERE clause with `criteria` ANDed together.
    ///
    /// The parameter bag is emptied first, so placeholders bound for the old
    /// clause are not sent with the new one. The placeholder counter keeps
    /// counting.
    pub fn where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.parts.where_clause = None;
        self.params.clear();
        self.and_where_criteria(criteria)
    }

    /// AND `criteria` onto the WHERE clause.
    pub fn and_where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        let predicates = self.criteria_predicates(criteria);
        self.and_where(predicates)
    }

    /// OR `criteria` onto the WHERE clause.
    pub fn or_where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        let predicates = self.criteria_predicates(criteria);
        self.or_where(predicates)
    }

    /// Turn criteria into predicates, binding every value.
    fn criteria_predicates(&mut self, criteria: Criteria) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(criteria.len());

        for criterion in criteria.entries {
            match criterion {
                Criterion::Predicate(predicate) => predicates.push(predicate),
                Criterion::Scalar { key, value } => {
                    let KeyOp { column, negated } = parse_key(&key);
                    let column = self.conn.quote_identifier(column);
                    let sql = if value.is_null() {
                        let not = if negated { "NOT " } else { "" };
                        format!("{column} IS {not}NULL")
                    } else {
                        let op = if negated { "!=" } else { "=" };
                        let placeholder = self.create_named_parameter(value);
                        format!("{column} {op} {placeholder}")
                    };
                    predicates.push(Predicate::Raw(sql));
                }
                Criterion::List { key, values } => {
                    if values.is_empty() {
                        continue;
                    }
                    let KeyOp { column, negated } = parse_key(&key);
                    let column = self.conn.quote_identifier(column);
                    let placeholders: Vec<String> = values
                        .into_iter()
                        .map(|value| self.create_named_parameter(value))
                        .collect();
                    let op = if negated { "NOT IN" } else { "IN" };
                    predicates.push(Predicate::Raw(format!(
                        "{column} {op} ({})",
                        placeholders.join(", ")
                    )));
                }
            }
        }

        predicates
    }
}
