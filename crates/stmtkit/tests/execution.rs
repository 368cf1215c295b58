use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stmtkit::{
    BufferedCursor, Connection, Criteria, InstrumentedConnection, ParamKey, QbError, QbResult,
    QueryBuilder, QueryOutcome, QueryRecord, QueryType, Row, SqlParams, SqlValue, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// In-memory connection that records every statement it is handed.
#[derive(Default)]
struct MemoryConn {
    rows: Vec<Row>,
    affected: Option<u64>,
    fail: Option<(i64, String)>,
    seen: Mutex<Vec<(String, SqlParams)>>,
}

impl MemoryConn {
    fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn affecting(n: u64) -> Self {
        Self {
            affected: Some(n),
            ..Self::default()
        }
    }

    fn failing(code: i64, message: &str) -> Self {
        Self {
            fail: Some((code, message.to_string())),
            ..Self::default()
        }
    }

    fn seen(&self) -> Vec<(String, SqlParams)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Connection for MemoryConn {
    type Cursor = BufferedCursor;

    fn prepare_and_execute(
        &self,
        sql: &str,
        params: &SqlParams,
    ) -> impl std::future::Future<Output = QbResult<Self::Cursor>> + Send {
        self.seen
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));

        let result = match (&self.fail, self.affected) {
            (Some((code, message)), _) => Err(QbError::execution(Some(*code), message.clone())),
            (None, Some(n)) => Ok(BufferedCursor::affected(n)),
            (None, None) => Ok(BufferedCursor::new(self.rows.clone())),
        };
        std::future::ready(result)
    }
}

fn user(id: i64, name: &str) -> Row {
    Row::new([
        ("id", SqlValue::Int(id)),
        ("name", SqlValue::Text(name.to_string())),
    ])
}

fn users_query(conn: &Arc<MemoryConn>) -> QueryBuilder<MemoryConn> {
    let mut qb = QueryBuilder::new(Arc::clone(conn));
    qb.select(["id", "name"])
        .from_as("users", "u")
        .where_criteria(Criteria::new().with("u.status", "active"));
    qb
}

#[tokio::test]
async fn fetch_all_associative_passes_sql_and_params() {
    init_tracing();
    let conn = Arc::new(MemoryConn::with_rows(vec![user(1, "alice"), user(2, "bob")]));
    let mut qb = users_query(&conn);

    let rows = qb.fetch_all_associative().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("name"), Some(&SqlValue::Text("bob".into())));

    let seen = conn.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].0,
        "SELECT `id`, `name` FROM `users` as `u` WHERE `u`.`status` = :dcValue1"
    );
    assert_eq!(
        seen[0].1.get(&ParamKey::from("dcValue1")),
        Some(&SqlValue::Text("active".into()))
    );
}

#[tokio::test]
async fn fetch_first_row_in_both_shapes() {
    init_tracing();
    let conn = Arc::new(MemoryConn::with_rows(vec![user(7, "carol"), user(8, "dave")]));
    let mut qb = users_query(&conn);

    let assoc = qb.fetch_associative().await.unwrap().unwrap();
    assert_eq!(assoc.get("id"), Some(&SqlValue::Int(7)));

    let numeric = qb.fetch_numeric().await.unwrap().unwrap();
    assert_eq!(
        numeric,
        vec![SqlValue::Int(7), SqlValue::Text("carol".into())]
    );

    let all = qb.fetch_all_numeric().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1][0], SqlValue::Int(8));

    // The cached SQL is reused for every execution.
    let seen = conn.seen();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|(sql, _)| sql == &seen[0].0));
}

#[tokio::test]
async fn fetch_on_empty_result_is_none() {
    let conn = Arc::new(MemoryConn::default());
    let mut qb = users_query(&conn);

    assert!(qb.fetch_associative().await.unwrap().is_none());
    assert!(qb.fetch_numeric().await.unwrap().is_none());
    assert!(qb.fetch_all_associative().await.unwrap().is_empty());
}

#[tokio::test]
async fn execute_statement_returns_affected_rows() {
    init_tracing();
    let conn = Arc::new(MemoryConn::affecting(4));
    let mut qb = QueryBuilder::new(Arc::clone(&conn));
    let status = qb.create_positional_parameter("archived");
    let cutoff = qb.create_positional_parameter(30);
    qb.update("orders")
        .set("status", &status)
        .and_where([format!("age_days > {cutoff}")]);

    assert_eq!(qb.execute_statement().await.unwrap(), 4);

    let seen = conn.seen();
    assert_eq!(
        seen[0].0,
        "UPDATE `orders` SET `status` = ? WHERE age_days > ?"
    );
    assert_eq!(seen[0].1.get(&ParamKey::Index(0)), Some(&SqlValue::Text("archived".into())));
    assert_eq!(seen[0].1.get(&ParamKey::Index(1)), Some(&SqlValue::Int(30)));
}

#[tokio::test]
async fn execution_errors_propagate_unchanged() {
    let conn = Arc::new(MemoryConn::failing(1146, "Table 'app.users' doesn't exist"));
    let mut qb = users_query(&conn);

    let err = qb.fetch_all_associative().await.unwrap_err();
    match &err {
        QbError::Execution { code, message } => {
            assert_eq!(*code, Some(1146));
            assert_eq!(message, "Table 'app.users' doesn't exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_execution_error());
    assert_eq!(conn.seen().len(), 1);
}

#[tokio::test]
async fn build_errors_never_reach_the_connection() {
    let conn = Arc::new(MemoryConn::default());
    let mut qb = QueryBuilder::new(Arc::clone(&conn));
    qb.select(["*"])
        .from_as("users", "u")
        .left_join("x", "orders", "o", Some("o.user_id = u.id"));

    let err = qb.fetch_all_associative().await.unwrap_err();
    assert!(matches!(err, QbError::UnknownAlias(ref alias) if alias == "x"));
    assert!(err.is_build_error());

    let mut delete = QueryBuilder::new(Arc::clone(&conn));
    delete.set_statement_type(stmtkit::StatementType::Delete);
    let err = delete.execute_statement().await.unwrap_err();
    assert!(matches!(err, QbError::MissingTarget(_)));

    assert!(conn.seen().is_empty());
}

#[tokio::test]
async fn unserializable_parameter_never_reaches_the_connection() {
    let conn = Arc::new(MemoryConn::default());
    let mut qb = QueryBuilder::new(Arc::clone(&conn));
    let by_cell: HashMap<(u8, u8), u8> = HashMap::from([((0, 0), 1)]);
    let cells = qb.create_named_parameter(Value::serialized(by_cell));
    qb.update("sheets").set("cells", &cells);

    let err = qb.execute_statement().await.unwrap_err();
    assert!(matches!(err, QbError::Serialization(_)), "{err:?}");
    assert!(conn.seen().is_empty());
}

#[tokio::test]
async fn builder_runs_through_instrumented_connection() {
    init_tracing();
    let records = Arc::new(Mutex::new(Vec::<QueryRecord>::new()));
    let sink = Arc::clone(&records);
    let conn = Arc::new(
        InstrumentedConnection::new(MemoryConn::with_rows(vec![user(1, "alice")]))
            .with_monitor(move |record: &QueryRecord| sink.lock().unwrap().push(record.clone()))
            .with_query_timeout(Duration::from_secs(5)),
    );

    let mut qb = QueryBuilder::new(Arc::clone(&conn));
    qb.select(["id", "name"]).from("users");
    let rows = qb.fetch_all_associative().await.unwrap();
    assert_eq!(rows, vec![user(1, "alice")]);

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].query_type, QueryType::Select);
    assert_eq!(records[0].outcome, QueryOutcome::Completed(1));
    assert_eq!(
        conn.inner().seen()[0].0,
        "SELECT `id`, `name` FROM `users`"
    );
}
