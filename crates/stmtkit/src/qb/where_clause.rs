//! WHERE and HAVING combinators.

use super::QueryBuilder;
use crate::client::Connection;
use crate::qb::expr::{Composite, Expression, Predicate};

/// Combine an existing clause with `added` under `kind`.
///
/// An existing expression of the same kind is extended; anything else becomes
/// the first part of a new expression.
fn combine(
    existing: Option<Predicate>,
    kind: Composite,
    added: Vec<Predicate>,
) -> Option<Predicate> {
    if added.is_empty() {
        return existing;
    }

    match existing {
        Some(Predicate::Nested(expr)) if expr.kind() == kind => {
            Some(Predicate::Nested(expr.with_all(added)))
        }
        Some(other) => {
            let mut parts = Vec::with_capacity(added.len() + 1);
            parts.push(other);
            parts.extend(added);
            Expression::from_parts(kind, parts).map(Predicate::Nested)
        }
        None => Expression::from_parts(kind, added).map(Predicate::Nested),
    }
}

/// Replace a clause: nothing clears it, one predicate installs verbatim.
fn replace(predicates: Vec<Predicate>) -> Option<Predicate> {
    let mut predicates = predicates;
    match predicates.len() {
        0 => None,
        1 => predicates.pop(),
        _ => Expression::from_parts(Composite::And, predicates).map(Predicate::Nested),
    }
}

fn collect<I>(predicates: I) -> Vec<Predicate>
where
    I: IntoIterator,
    I::Item: Into<Predicate>,
{
    predicates.into_iter().map(Into::into).collect()
}

impl<C: Connection> QueryBuilder<C> {
    /// Replace the WHERE clause.
    ///
    /// No predicates clear it; one is installed verbatim; several are ANDed.
    pub fn set_where<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        self.parts.where_clause = replace(collect(predicates));
        self.mark_dirty()
    }

    /// AND predicates onto the WHERE clause.
    pub fn and_where<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        let existing = self.parts.where_clause.take();
        self.parts.where_clause = combine(existing, Composite::And, collect(predicates));
        self.mark_dirty()
    }

    /// OR predicates onto the WHERE clause.
    pub fn or_where<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        let existing = self.parts.where_clause.take();
        self.parts.where_clause = combine(existing, Composite::Or, collect(predicates));
        self.mark_dirty()
    }

    /// Replace the HAVING clause, with the same rules as [`set_where`](Self::set_where).
    pub fn set_having<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        self.parts.having = replace(collect(predicates));
        self.mark_dirty()
    }

    /// AND predicates onto the HAVING clause.
    pub fn and_having<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        let existing = self.parts.having.take();
        self.parts.having = combine(existing, Composite::And, collect(predicates));
        self.mark_dirty()
    }

    /// OR predicates onto the HAVING clause.
    pub fn or_having<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        let existing = self.parts.having.take();
        self.parts.having = combine(existing, Composite::Or, collect(predicates));
        self.mark_dirty()
    }
}
