//! JOIN mutators and FROM/JOIN rendering.
//!
//! Joins are stored under the alias they attach to and are only validated
//! when the statement is rendered, so a join may be declared before the FROM
//! source or join that introduces its attachment point.

use super::QueryBuilder;
use crate::client::Connection;
use crate::error::{QbError, QbResult};
use crate::qb::parts::{Join, JoinKind};
use std::collections::HashSet;

impl<C: Connection> QueryBuilder<C> {
    /// Attach an `INNER JOIN` under `from_alias`.
    pub fn inner_join(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        self.add_join(JoinKind::Inner, from_alias, table, alias, condition)
    }

    /// Alias of [`inner_join`](Self::inner_join).
    pub fn join(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        self.inner_join(from_alias, table, alias, condition)
    }

    /// Attach a `LEFT JOIN` under `from_alias`.
    pub fn left_join(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        self.add_join(JoinKind::Left, from_alias, table, alias, condition)
    }

    /// Attach a `RIGHT JOIN` under `from_alias`.
    pub fn right_join(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        self.add_join(JoinKind::Right, from_alias, table, alias, condition)
    }

    fn add_join(
        &mut self,
        kind: JoinKind,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        self.parts.joins.push(
            from_alias,
            Join {
                kind,
                table: table.to_string(),
                alias: alias.to_string(),
                condition: condition.map(str::to_string),
            },
        );
        self.mark_dirty()
    }

    /// Render every FROM source with the joins reachable from it.
    ///
    /// Joins are emitted depth-first: each join is followed by the joins
    /// attached to its own alias before its next sibling.
    pub(super) fn from_clauses(&self) -> QbResult<Vec<String>> {
        let graph = &self.parts.joins;
        let mut known: HashSet<&str> = HashSet::new();
        let mut clauses = Vec::with_capacity(self.parts.from.len());

        for target in &self.parts.from {
            let mut sql = self.quote_column(&target.table);
            if let Some(alias) = &target.alias {
                sql.push_str(" as ");
                sql.push_str(&self.quote_column(alias));
            }

            let reference = target.reference();
            if !known.insert(reference) {
                return Err(QbError::DuplicateAlias(reference.to_string()));
            }

            let mut stack: Vec<&Join> = graph.attached_to(reference).iter().rev().collect();
            while let Some(join) = stack.pop() {
                if !known.insert(join.alias.as_str()) {
                    return Err(QbError::DuplicateAlias(join.alias.clone()));
                }

                sql.push(' ');
                sql.push_str(join.kind.as_sql());
                sql.push(' ');
                sql.push_str(&self.quote_column(&join.table));
                sql.push(' ');
                sql.push_str(&self.quote_column(&join.alias));
                if let Some(condition) = &join.condition {
                    sql.push_str(" ON ");
                    sql.push_str(condition);
                }

                stack.extend(graph.attached_to(&join.alias).iter().rev());
            }

            clauses.push(sql);
        }

        if let Some(orphan) = graph.attachment_points().find(|p| !known.contains(p)) {
            return Err(QbError::UnknownAlias(orphan.to_string()));
        }

        Ok(clauses)
    }
}
