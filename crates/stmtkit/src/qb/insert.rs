//! INSERT target, values and rendering.

use super::QueryBuilder;
use crate::client::Connection;
use crate::error::{QbError, QbResult};
use crate::qb::parts::{FromTarget, InsertValues, StatementType};
use std::fmt::Display;

impl<C: Connection> QueryBuilder<C> {
    /// Switch to an INSERT into `table`, replacing any previous target.
    ///
    /// Use [`set_statement_type`](Self::set_statement_type) to keep it.
    pub fn insert(&mut self, table: impl Into<String>) -> &mut Self {
        self.retarget(StatementType::Insert, FromTarget::new(table, None))
    }

    /// Set one column's value token.
    ///
    /// The token is emitted verbatim: pass a placeholder from
    /// [`create_named_parameter`](Self::create_named_parameter) or a literal.
    pub fn set_value(&mut self, column: impl Into<String>, value: impl Display) -> &mut Self {
        self.parts.values.set(column, value.to_string());
        self.mark_dirty()
    }

    /// Replace all column value tokens.
    pub fn values<I, K, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Display,
    {
        self.parts.values = values
            .into_iter()
            .map(|(column, value)| (column.into(), value.to_string()))
            .collect::<InsertValues>();
        self.mark_dirty()
    }

    pub(super) fn render_insert(&self) -> QbResult<String> {
        let target = self.render_insert_target()?;
        let columns: Vec<String> = self
            .parts
            .values
            .iter()
            .map(|(column, _)| self.quote_column(column))
            .collect();
        let values: Vec<&str> = self.parts.values.iter().map(|(_, value)| value).collect();

        Ok(format!(
            "INSERT INTO {target} ({}) VALUES({})",
            columns.join(", "),
            values.join(", ")
        ))
    }

    /// INSERT ignores the target alias.
    fn render_insert_target(&self) -> QbResult<String> {
        let target = self
            .parts
            .from
            .first()
            .ok_or(QbError::MissingTarget(StatementType::Insert))?;
        Ok(self.quote_column(&target.table))
    }
}
