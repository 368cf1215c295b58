//! The mutable set of statement parts owned by a [`QueryBuilder`](super::QueryBuilder).

use crate::qb::expr::Predicate;

/// The kind of statement a builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementType {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

/// Whether the cached SQL still matches the parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    Dirty,
    #[default]
    Clean,
}

/// A FROM source (or the single INSERT/UPDATE/DELETE target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromTarget {
    pub table: String,
    pub alias: Option<String>,
}

impl FromTarget {
    pub fn new(table: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            table: table.into(),
            alias,
        }
    }

    /// The name joins attach to: the alias if present, else the raw table name.
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// One join attached to a source alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub condition: Option<String>,
}

/// Joins keyed by the alias they attach to, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinGraph {
    entries: Vec<(String, Vec<Join>)>,
}

impl JoinGraph {
    pub fn push(&mut self, from_alias: impl Into<String>, join: Join) {
        let from_alias = from_alias.into();
        match self.entries.iter_mut().find(|(alias, _)| *alias == from_alias) {
            Some((_, joins)) => joins.push(join),
            None => self.entries.push((from_alias, vec![join])),
        }
    }

    /// Joins attached to `alias` (empty if none).
    pub fn attached_to(&self, alias: &str) -> &[Join] {
        self.entries
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, joins)| joins.as_slice())
            .unwrap_or_default()
    }

    /// Attachment points in declaration order.
    pub fn attachment_points(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(alias, _)| alias.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, joins)| joins.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered `column -> value token` pairs for INSERT.
///
/// Setting an existing column replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertValues {
    entries: Vec<(String, String)>,
}

impl InsertValues {
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for InsertValues {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut values = InsertValues::default();
        for (column, value) in iter {
            values.set(column, value);
        }
        values
    }
}

/// Individually resettable statement parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPart {
    Select,
    Distinct,
    From,
    Join,
    Set,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Values,
}

impl QueryPart {
    pub const ALL: [QueryPart; 10] = [
        QueryPart::Select,
        QueryPart::Distinct,
        QueryPart::From,
        QueryPart::Join,
        QueryPart::Set,
        QueryPart::Where,
        QueryPart::GroupBy,
        QueryPart::Having,
        QueryPart::OrderBy,
        QueryPart::Values,
    ];
}

/// All parts of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParts {
    pub select: Vec<String>,
    pub distinct: bool,
    pub from: Vec<FromTarget>,
    pub joins: JoinGraph,
    pub set: Vec<String>,
    pub where_clause: Option<Predicate>,
    pub group_by: Vec<String>,
    pub having: Option<Predicate>,
    pub order_by: Vec<String>,
    pub values: InsertValues,
}

impl QueryParts {
    /// Restore one part to its default.
    pub fn reset(&mut self, part: QueryPart) {
        match part {
            QueryPart::Select => self.select.clear(),
            QueryPart::Distinct => self.distinct = false,
            QueryPart::From => self.from.clear(),
            QueryPart::Join => self.joins = JoinGraph::default(),
            QueryPart::Set => self.set.clear(),
            QueryPart::Where => self.where_clause = None,
            QueryPart::GroupBy => self.group_by.clear(),
            QueryPart::Having => self.having = None,
            QueryPart::OrderBy => self.order_by.clear(),
            QueryPart::Values => self.values = InsertValues::default(),
        }
    }
}
