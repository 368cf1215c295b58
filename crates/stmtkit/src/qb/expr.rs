//! Composite AND/OR expressions for WHERE/HAVING clauses.
//!
//! An [`Expression`] is an immutable tree of raw predicate fragments and nested
//! expressions. It always holds at least one part; combining never mutates the
//! receiver but returns a new expression.
//!
//! Rendering rules:
//! - one part: the part verbatim (no parentheses)
//! - several parts: every part parenthesized, joined by ` AND ` / ` OR `
//!
//! ```ignore
//! use stmtkit::Expression;
//!
//! let e = Expression::and("a = 1").with("b = 2");
//! assert_eq!(e.to_sql(), "(a = 1) AND (b = 2)");
//! ```

use std::fmt;

/// The connective of a composite expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composite {
    And,
    Or,
}

impl Composite {
    /// SQL keyword for this connective.
    pub fn as_str(self) -> &'static str {
        match self {
            Composite::And => "AND",
            Composite::Or => "OR",
        }
    }
}

/// One part of an [`Expression`]: a raw SQL fragment or a nested expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Raw(String),
    Nested(Expression),
}

impl Predicate {
    /// Render the predicate as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            Predicate::Raw(sql) => out.push_str(sql),
            Predicate::Nested(expr) => expr.write_sql(out),
        }
    }
}

impl From<&str> for Predicate {
    fn from(sql: &str) -> Self {
        Predicate::Raw(sql.to_string())
    }
}

impl From<String> for Predicate {
    fn from(sql: String) -> Self {
        Predicate::Raw(sql)
    }
}

impl From<&String> for Predicate {
    fn from(sql: &String) -> Self {
        Predicate::Raw(sql.clone())
    }
}

impl From<Expression> for Predicate {
    fn from(expr: Expression) -> Self {
        Predicate::Nested(expr)
    }
}

/// An immutable AND/OR expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    kind: Composite,
    parts: Vec<Predicate>,
}

impl Expression {
    /// Create an AND expression with one part.
    pub fn and(part: impl Into<Predicate>) -> Self {
        Self::single(Composite::And, part.into())
    }

    /// Create an OR expression with one part.
    pub fn or(part: impl Into<Predicate>) -> Self {
        Self::single(Composite::Or, part.into())
    }

    /// AND over all `parts`; `None` if there are none.
    pub fn all<P: Into<Predicate>>(parts: impl IntoIterator<Item = P>) -> Option<Self> {
        Self::from_parts(Composite::And, parts.into_iter().map(Into::into).collect())
    }

    /// OR over all `parts`; `None` if there are none.
    pub fn any<P: Into<Predicate>>(parts: impl IntoIterator<Item = P>) -> Option<Self> {
        Self::from_parts(Composite::Or, parts.into_iter().map(Into::into).collect())
    }

    /// Build an expression of `kind`; `None` if `parts` is empty.
    pub fn from_parts(kind: Composite, parts: Vec<Predicate>) -> Option<Self> {
        if parts.is_empty() {
            return None;
        }
        Some(Self { kind, parts })
    }

    fn single(kind: Composite, part: Predicate) -> Self {
        Self {
            kind,
            parts: vec![part],
        }
    }

    /// A new expression of the same kind with `part` appended.
    #[must_use]
    pub fn with(&self, part: impl Into<Predicate>) -> Self {
        let mut that = self.clone();
        that.parts.push(part.into());
        that
    }

    /// A new expression of the same kind with all `parts` appended.
    #[must_use]
    pub fn with_all<P: Into<Predicate>>(&self, parts: impl IntoIterator<Item = P>) -> Self {
        let mut that = self.clone();
        that.parts.extend(parts.into_iter().map(Into::into));
        that
    }

    pub fn kind(&self) -> Composite {
        self.kind
    }

    pub fn parts(&self) -> &[Predicate] {
        &self.parts
    }

    /// Number of direct parts (always at least one).
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Render the expression as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        if let [only] = self.parts.as_slice() {
            only.write_sql(out);
            return;
        }

        let sep = match self.kind {
            Composite::And => ") AND (",
            Composite::Or => ") OR (",
        };
        out.push('(');
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            part.write_sql(out);
        }
        out.push(')');
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
