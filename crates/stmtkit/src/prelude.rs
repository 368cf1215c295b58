//! Convenient imports for typical `stmtkit` usage.
//!
//! ```ignore
//! use stmtkit::prelude::*;
//! ```

pub use crate::{
    Connection, Criteria, Expression, QbError, QbResult, QueryBuilder, Row, RowCursor, SqlValue,
    StatementType, Value,
};
