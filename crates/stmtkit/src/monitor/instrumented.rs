use super::monitors::{QueryMonitor, TracingMonitor};
use super::record::{QueryOutcome, QueryRecord, QueryType};
use crate::client::{Connection, RowCursor};
use crate::error::{QbError, QbResult};
use crate::qb::SqlParams;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A [`Connection`] that benchmarks every statement it executes.
///
/// Each call is timed, optionally bounded by a timeout, and reported to a
/// [`QueryMonitor`] ([`TracingMonitor`] unless replaced). Results and errors
/// pass through unchanged. Identifier quoting is delegated to the inner
/// connection.
pub struct InstrumentedConnection<C> {
    inner: C,
    monitor: Arc<dyn QueryMonitor>,
    query_timeout: Option<Duration>,
    slow_threshold: Option<Duration>,
}

impl<C: Connection> InstrumentedConnection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            monitor: Arc::new(TracingMonitor::default()),
            query_timeout: None,
            slow_threshold: None,
        }
    }

    pub fn with_monitor<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.with_monitor_arc(Arc::new(monitor))
    }

    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Fail statements that run longer than `timeout` with [`QbError::Timeout`].
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Flag records slower than `threshold` as slow.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    pub fn slow_threshold(&self) -> Option<Duration> {
        self.slow_threshold
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    async fn run(&self, sql: &str, params: &SqlParams) -> QbResult<C::Cursor> {
        let start = Instant::now();
        let execution = self.inner.prepare_and_execute(sql, params);
        let result = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, execution)
                .await
                .unwrap_or(Err(QbError::Timeout(limit))),
            None => execution.await,
        };
        let duration = start.elapsed();

        let outcome = match &result {
            Ok(cursor) => QueryOutcome::Completed(cursor.row_count()),
            Err(QbError::Timeout(limit)) => QueryOutcome::TimedOut(*limit),
            Err(err) => QueryOutcome::Failed(err.to_string()),
        };
        self.monitor.record(&QueryRecord {
            sql: sql.to_string(),
            query_type: QueryType::from_sql(sql),
            param_count: params.len(),
            duration,
            outcome,
            slow: self.slow_threshold.is_some_and(|limit| duration > limit),
        });
        result
    }
}

impl<C: Connection> Connection for InstrumentedConnection<C> {
    type Cursor = C::Cursor;

    fn quote_identifier(&self, ident: &str) -> String {
        self.inner.quote_identifier(ident)
    }

    fn prepare_and_execute(
        &self,
        sql: &str,
        params: &SqlParams,
    ) -> impl std::future::Future<Output = QbResult<Self::Cursor>> + Send {
        self.run(sql, params)
    }
}
