//! UPDATE target, assignments and rendering.

use super::QueryBuilder;
use crate::client::Connection;
use crate::error::QbResult;
use crate::qb::parts::{FromTarget, StatementType};
use std::fmt::Display;

impl<C: Connection> QueryBuilder<C> {
    /// Switch to an UPDATE of `table`, replacing any previous target.
    ///
    /// To switch to UPDATE and keep the current target, use
    /// [`set_statement_type`](Self::set_statement_type).
    pub fn update(&mut self, table: impl Into<String>) -> &mut Self {
        self.retarget(StatementType::Update, FromTarget::new(table, None))
    }

    /// Switch to an UPDATE of `table` aliased as `alias`.
    ///
    /// The alias is emitted unquoted.
    pub fn update_as(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.retarget(
            StatementType::Update,
            FromTarget::new(table, Some(alias.into())),
        )
    }

    /// Append `` `column` = value `` to the SET list.
    ///
    /// `value` is emitted verbatim and is not bound.
    pub fn set(&mut self, column: &str, value: impl Display) -> &mut Self {
        let assignment = format!("{} = {value}", self.quote_column(column));
        self.parts.set.push(assignment);
        self.mark_dirty()
    }

    pub(super) fn retarget(
        &mut self,
        statement_type: StatementType,
        target: FromTarget,
    ) -> &mut Self {
        self.statement_type = statement_type;
        self.parts.from = vec![target];
        self.mark_dirty()
    }

    pub(super) fn render_update(&self) -> QbResult<String> {
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.render_target()?,
            self.parts.set.join(", ")
        );
        self.write_where(&mut sql);
        Ok(sql)
    }
}
