//! # stmtkit
//!
//! A stateful SQL statement builder with alias-checked joins and bound
//! parameters.
//!
//! ## Features
//!
//! - **Composable parts**: SELECT / INSERT / UPDATE / DELETE built from independent parts
//! - **Render cache**: SQL is rendered once and reused until the builder changes
//! - **Join graph**: joins attach to aliases, checked for duplicates and dangling parents
//! - **AND/OR expressions**: immutable predicate trees for WHERE and HAVING
//! - **Parameter bag**: named (`:name`) and positional (`?`) placeholders
//! - **Execution timing**: per-statement benchmarks and timeouts around any [`Connection`]
//!
//! ## Quick start
//!
//! ```ignore
//! use stmtkit::prelude::*;
//! use std::sync::Arc;
//!
//! let mut qb = QueryBuilder::new(Arc::new(conn));
//! qb.select(["id", "name"])
//!     .from_as("users", "u")
//!     .left_join("u", "orders", "o", Some("o.user_id = u.id"))
//!     .where_criteria(Criteria::new().with("u.status", "active"))
//!     .set_max_results(Some(10));
//!
//! // SELECT `id`, `name` FROM `users` as `u` LEFT JOIN `orders` `o` ON o.user_id = u.id
//! //   WHERE `u`.`status` = :dcValue1 LIMIT 10
//! let sql = qb.get_sql()?;
//! let rows = qb.fetch_all_associative().await?;
//! ```

pub mod client;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod prelude;
pub mod qb;

pub use client::{BufferedCursor, Connection, Row, RowCursor};
pub use error::{QbError, QbResult};
pub use ident::{Quoter, is_numeric, quote_identifier};
pub use monitor::{
    InstrumentedConnection, QueryMonitor, QueryOutcome, QueryRecord, QueryType, TracingMonitor,
};
pub use qb::{
    BuilderOptions, Composite, Criteria, Criterion, Displayed, Expression, Json, ParamKey,
    ParamObject, Predicate, QueryBuilder, QueryPart, RenderState, Serialized, SqlParams, SqlValue,
    StatementType, Value,
};
