//! Execution through the bound [`Connection`].
//!
//! Build and serialization errors surface before the connection is touched;
//! execution errors are returned exactly as the connection reported them.

use super::QueryBuilder;
use crate::client::{Connection, Row, RowCursor};
use crate::error::QbResult;
use crate::qb::param::SqlValue;

impl<C: Connection> QueryBuilder<C> {
    /// Render (or reuse) the SQL and execute it with the coerced parameters.
    pub async fn execute_query(&mut self) -> QbResult<C::Cursor> {
        let sql = self.get_sql()?;
        let params = self.get_query_sql_parameters()?;
        tracing::debug!(
            target: "stmtkit.qb",
            statement = ?self.statement_type,
            params = params.len(),
            "executing statement"
        );
        self.conn.prepare_and_execute(&sql, &params).await
    }

    /// Execute and return the number of affected rows.
    pub async fn execute_statement(&mut self) -> QbResult<u64> {
        Ok(self.execute_query().await?.row_count())
    }

    /// First row keyed by column name.
    pub async fn fetch_associative(&mut self) -> QbResult<Option<Row>> {
        Ok(self.execute_query().await?.next_row())
    }

    /// First row as positional values.
    pub async fn fetch_numeric(&mut self) -> QbResult<Option<Vec<SqlValue>>> {
        Ok(self.execute_query().await?.next_row().map(Row::into_values))
    }

    /// All rows keyed by column name.
    pub async fn fetch_all_associative(&mut self) -> QbResult<Vec<Row>> {
        Ok(self.execute_query().await?.fetch_all())
    }

    /// All rows as positional values.
    pub async fn fetch_all_numeric(&mut self) -> QbResult<Vec<Vec<SqlValue>>> {
        let rows = self.execute_query().await?.fetch_all();
        Ok(rows.into_iter().map(Row::into_values).collect())
    }
}
