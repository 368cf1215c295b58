//! Connection capability consumed by the query builder.
//!
//! The builder never talks to a database itself. It needs exactly two things
//! from its environment: a way to quote identifiers and a way to run prepared
//! SQL with bound parameters. Both live on [`Connection`].

use crate::error::QbResult;
use crate::ident::quote_identifier;
use crate::qb::{SqlParams, SqlValue};
use std::collections::VecDeque;
use std::sync::Arc;

/// A database connection as seen by [`QueryBuilder`](crate::QueryBuilder).
///
/// Implementations own the network protocol, authentication and pooling.
/// Errors are reported as [`QbError::Execution`](crate::QbError::Execution)
/// and propagated to the caller unchanged.
pub trait Connection: Send + Sync {
    /// Cursor over the rows produced by a statement.
    type Cursor: RowCursor;

    /// Quote a (possibly dotted) identifier.
    ///
    /// The default implementation uses backticks, see [`crate::ident`].
    fn quote_identifier(&self, ident: &str) -> String {
        quote_identifier(ident)
    }

    /// Prepare `sql`, bind `params` and execute it.
    ///
    /// Named parameters are keyed without their leading `:`; positional
    /// parameters are keyed by their zero-based index.
    fn prepare_and_execute(
        &self,
        sql: &str,
        params: &SqlParams,
    ) -> impl std::future::Future<Output = QbResult<Self::Cursor>> + Send;
}

impl<C: Connection> Connection for Arc<C> {
    type Cursor = C::Cursor;

    fn quote_identifier(&self, ident: &str) -> String {
        (**self).quote_identifier(ident)
    }

    fn prepare_and_execute(
        &self,
        sql: &str,
        params: &SqlParams,
    ) -> impl std::future::Future<Output = QbResult<Self::Cursor>> + Send {
        (**self).prepare_and_execute(sql, params)
    }
}

/// Rows returned by an executed statement.
pub trait RowCursor: Send {
    /// Rows affected by the statement (or returned, for drivers that report it).
    fn row_count(&self) -> u64;

    /// Fetch the next row, or `None` when the cursor is exhausted.
    fn next_row(&mut self) -> Option<Row>;

    /// Drain the remaining rows.
    fn fetch_all(&mut self) -> Vec<Row> {
        std::iter::from_fn(|| self.next_row()).collect()
    }
}

/// A single result row: ordered `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Create a row from ordered column/value pairs.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Look up a value by column name (first match wins).
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Look up a value by position.
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Column names in result order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The row as positional values.
    pub fn into_values(self) -> Vec<SqlValue> {
        self.columns.into_iter().map(|(_, value)| value).collect()
    }
}

/// A fully buffered cursor.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    rows: VecDeque<Row>,
    row_count: u64,
}

impl BufferedCursor {
    /// Cursor over `rows`; `row_count` reports the number of rows.
    pub fn new(rows: Vec<Row>) -> Self {
        let row_count = rows.len() as u64;
        Self {
            rows: rows.into(),
            row_count,
        }
    }

    /// Cursor for a statement that affected `n` rows and returned none.
    pub fn affected(n: u64) -> Self {
        Self {
            rows: VecDeque::new(),
            row_count: n,
        }
    }
}

impl RowCursor for BufferedCursor {
    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn next_row(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }
}
