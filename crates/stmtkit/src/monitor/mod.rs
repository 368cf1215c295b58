//! Per-statement benchmarking around a [`Connection`](crate::Connection).
//!
//! [`InstrumentedConnection`] wraps any connection, times each
//! `prepare_and_execute` call and hands a [`QueryRecord`] to a
//! [`QueryMonitor`]. An optional timeout turns a stalled call into
//! [`QbError::Timeout`](crate::QbError::Timeout).
//!
//! # Example
//!
//! ```rust,ignore
//! use stmtkit::monitor::{InstrumentedConnection, QueryRecord};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let conn = InstrumentedConnection::new(db)
//!     .with_query_timeout(Duration::from_secs(30))
//!     .with_slow_threshold(Duration::from_millis(500))
//!     .with_monitor(|record: &QueryRecord| metrics.observe(record.duration));
//!
//! let mut qb = QueryBuilder::new(Arc::new(conn));
//! ```

mod instrumented;
mod monitors;
mod record;


pub use instrumented::InstrumentedConnection;
pub use monitors::{QueryMonitor, TracingMonitor};
pub use record::{QueryOutcome, QueryRecord, QueryType};
