use std::fmt;
use std::time::Duration;

/// The kind of statement being executed, detected from its SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// Anything else (DDL, vendor commands, ...)
    Other,
}

impl QueryType {
    /// Detect the statement kind from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("");

        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// How one execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Rows affected or returned, as counted by the cursor.
    Completed(u64),
    /// The connection failed with this message.
    Failed(String),
    /// The timeout elapsed before the connection answered.
    TimedOut(Duration),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Completed(n) => write!(f, "{n} rows"),
            QueryOutcome::Failed(e) => write!(f, "error: {e}"),
            QueryOutcome::TimedOut(d) => write!(f, "timeout after {d:?}"),
        }
    }
}

/// Benchmark of a single `prepare_and_execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub sql: String,
    pub query_type: QueryType,
    pub param_count: usize,
    /// Wall time from the call until the connection answered (or the timeout).
    pub duration: Duration,
    pub outcome: QueryOutcome,
    /// `duration` exceeded the slow-statement threshold.
    pub slow: bool,
}
