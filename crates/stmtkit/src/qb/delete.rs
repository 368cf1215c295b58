//! DELETE target and rendering.

use super::QueryBuilder;
use crate::client::Connection;
use crate::error::QbResult;
use crate::qb::parts::{FromTarget, StatementType};

impl<C: Connection> QueryBuilder<C> {
    /// Switch to a DELETE from `table`, replacing any previous target.
    ///
    /// [`set_statement_type`](Self::set_statement_type) switches without
    /// touching the target.
    pub fn delete(&mut self, table: impl Into<String>) -> &mut Self {
        self.retarget(StatementType::Delete, FromTarget::new(table, None))
    }

    /// Switch to a DELETE from `table` aliased as `alias`.
    pub fn delete_as(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.retarget(
            StatementType::Delete,
            FromTarget::new(table, Some(alias.into())),
        )
    }

    pub(super) fn render_delete(&self) -> QbResult<String> {
        let mut sql = format!("DELETE FROM {}", self.render_target()?);
        self.write_where(&mut sql);
        Ok(sql)
    }
}
