use super::record::{QueryOutcome, QueryRecord};

/// Receives one [`QueryRecord`] per executed statement.
///
/// Any `Fn(&QueryRecord)` closure is a monitor.
pub trait QueryMonitor: Send + Sync {
    fn record(&self, record: &QueryRecord);
}

impl<F> QueryMonitor for F
where
    F: Fn(&QueryRecord) + Send + Sync,
{
    fn record(&self, record: &QueryRecord) {
        self(record)
    }
}

/// Reports every record as a `tracing` event under target `stmtkit.sql`.
///
/// Completed statements are `debug!` events; slow, failed and timed out
/// statements are `warn!` events.
#[derive(Debug, Clone)]
pub struct TracingMonitor {
    /// Truncate SQL in events (bytes). `None` keeps it whole.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self {
            max_sql_length: Some(200),
        }
    }
}

impl TracingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        let Some(max) = self.max_sql_length.filter(|max| sql.len() > *max) else {
            return sql.into();
        };
        let mut end = max;
        while !sql.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &sql[..end]).into()
    }
}

impl QueryMonitor for TracingMonitor {
    fn record(&self, record: &QueryRecord) {
        let sql = self.display_sql(&record.sql);
        let duration_ms = record.duration.as_secs_f64() * 1000.0;

        match &record.outcome {
            QueryOutcome::Completed(rows) if !record.slow => tracing::debug!(
                target: "stmtkit.sql",
                query_type = ?record.query_type,
                params = record.param_count,
                rows,
                duration_ms,
                sql = %sql,
                "statement completed"
            ),
            QueryOutcome::Completed(rows) => tracing::warn!(
                target: "stmtkit.sql",
                query_type = ?record.query_type,
                params = record.param_count,
                rows,
                duration_ms,
                sql = %sql,
                "slow statement"
            ),
            outcome => tracing::warn!(
                target: "stmtkit.sql",
                query_type = ?record.query_type,
                params = record.param_count,
                duration_ms,
                outcome = %outcome,
                sql = %sql,
                "statement failed"
            ),
        }
    }
}
