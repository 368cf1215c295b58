//! Stateful SQL statement builder.
//!
//! A [`QueryBuilder`] accumulates the parts of one SELECT, INSERT, UPDATE or
//! DELETE statement, renders them to a single SQL string and carries the
//! parameters bound for that string.
//!
//! # Features
//!
//! - **Render cache**: `get_sql` renders once and reuses the result until a mutator runs
//! - **Join graph**: joins attach to aliases and are validated when rendered
//! - **Parameter bag**: named (`:name`) and positional (`?`) placeholders share one counter
//! - **Criteria**: key/value filters with `!=` / `in` / `not in` key suffixes
//!
//! # Usage
//!
//! ```ignore
//! use stmtkit::prelude::*;
//!
//! let mut qb = QueryBuilder::new(conn);
//! qb.select(["id", "name"])
//!     .from_as("users", "u")
//!     .left_join("u", "orders", "o", Some("o.user_id = u.id"))
//!     .where_criteria(Criteria::new().with("u.status", "active"))
//!     .set_max_results(Some(10));
//!
//! // Raw predicates bind their values explicitly.
//! let min = qb.create_named_parameter(100);
//! qb.and_where([format!("o.total >= {min}")]);
//!
//! let rows = qb.fetch_all_associative().await?;
//! ```

mod criteria;
mod delete;
mod execute;
mod expr;
mod insert;
mod join;
mod param;
mod parts;
mod select;
mod update;
mod where_clause;


pub use criteria::{Criteria, Criterion};
pub use expr::{Composite, Expression, Predicate};
pub use param::{
    Displayed, Json, ParamKey, ParamMap, ParamObject, Serialized, SqlParams, SqlValue, Value,
    coerce_params,
};
pub use parts::{
    FromTarget, InsertValues, Join, JoinGraph, JoinKind, QueryPart, QueryParts, RenderState,
    StatementType,
};

use crate::client::Connection;
use crate::error::{QbError, QbResult};
use crate::ident::is_numeric;
use std::fmt;
use std::sync::Arc;

/// Default stem of auto-generated named placeholders (`:dcValue1`, ...).
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "dcValue";

/// Construction-time options for a [`QueryBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Stem of auto-generated named placeholders.
    pub placeholder_prefix: String,
    /// Initial value of the select lock.
    pub select_locked: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
            select_locked: false,
        }
    }
}

impl BuilderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stem of auto-generated placeholders.
    pub fn placeholder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.placeholder_prefix = prefix.into();
        self
    }

    /// Start with the select lock engaged.
    pub fn select_locked(mut self, locked: bool) -> Self {
        self.select_locked = locked;
        self
    }
}

/// Builder for one SQL statement bound to a connection.
///
/// Every mutator marks the builder dirty; [`get_sql`](Self::get_sql) renders
/// and caches. Cloning yields an independent builder sharing the connection.
pub struct QueryBuilder<C> {
    conn: Arc<C>,
    parts: QueryParts,
    statement_type: StatementType,
    state: RenderState,
    sql: Option<String>,
    params: ParamMap,
    bound_counter: usize,
    first_result: u64,
    max_results: Option<u64>,
    select_locked: bool,
    placeholder_prefix: String,
}

impl<C> Clone for QueryBuilder<C> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            parts: self.parts.clone(),
            statement_type: self.statement_type,
            state: self.state,
            sql: self.sql.clone(),
            params: self.params.clone(),
            bound_counter: self.bound_counter,
            first_result: self.first_result,
            max_results: self.max_results,
            select_locked: self.select_locked,
            placeholder_prefix: self.placeholder_prefix.clone(),
        }
    }
}

impl<C> fmt::Debug for QueryBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("statement_type", &self.statement_type)
            .field("state", &self.state)
            .field("parts", &self.parts)
            .field("params", &self.params)
            .field("first_result", &self.first_result)
            .field("max_results", &self.max_results)
            .field("select_locked", &self.select_locked)
            .finish_non_exhaustive()
    }
}

impl<C: Connection> QueryBuilder<C> {
    /// Create an empty SELECT builder.
    pub fn new(conn: Arc<C>) -> Self {
        Self::with_options(conn, BuilderOptions::default())
    }

    /// Create an empty SELECT builder with explicit options.
    pub fn with_options(conn: Arc<C>, options: BuilderOptions) -> Self {
        Self {
            conn,
            parts: QueryParts::default(),
            statement_type: StatementType::Select,
            state: RenderState::Clean,
            sql: None,
            params: ParamMap::new(),
            bound_counter: 0,
            first_result: 0,
            max_results: None,
            select_locked: options.select_locked,
            placeholder_prefix: options.placeholder_prefix,
        }
    }

    // ==================== Accessors ====================

    pub fn connection(&self) -> &Arc<C> {
        &self.conn
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    pub fn parts(&self) -> &QueryParts {
        &self.parts
    }

    pub fn first_result(&self) -> u64 {
        self.first_result
    }

    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    pub fn is_select_locked(&self) -> bool {
        self.select_locked
    }

    /// Engage or release the select lock.
    ///
    /// While locked, `select`/`add_select` keep an existing non-empty list.
    pub fn set_select_locked(&mut self, locked: bool) -> &mut Self {
        self.select_locked = locked;
        self
    }

    /// Switch the statement type without touching any part.
    ///
    /// An INSERT/UPDATE/DELETE keeps the current target table.
    pub fn set_statement_type(&mut self, statement_type: StatementType) -> &mut Self {
        self.statement_type = statement_type;
        self.mark_dirty()
    }

    // ==================== Parameters ====================

    pub fn parameters(&self) -> &ParamMap {
        &self.params
    }

    pub fn parameter(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        self.params.get(&key.into())
    }

    /// Bind `value` under `key`, replacing any previous binding.
    pub fn set_parameter(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self.mark_dirty()
    }

    /// Replace the whole parameter bag.
    pub fn set_parameters<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ParamKey>,
        V: Into<Value>,
    {
        self.params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.mark_dirty()
    }

    /// Bind `value` under a fresh `:{prefix}{n}` name and return the placeholder.
    pub fn create_named_parameter(&mut self, value: impl Into<Value>) -> String {
        self.bound_counter += 1;
        let placeholder = format!(":{}{}", self.placeholder_prefix, self.bound_counter);
        self.bind_named(&placeholder, value.into());
        placeholder
    }

    /// Bind `value` under the caller's `placeholder` and return it unchanged.
    ///
    /// The shared counter is not advanced.
    pub fn create_named_parameter_as(
        &mut self,
        value: impl Into<Value>,
        placeholder: &str,
    ) -> String {
        self.bind_named(placeholder, value.into());
        placeholder.to_string()
    }

    /// Bind `value` at the next positional index and return `?`.
    pub fn create_positional_parameter(&mut self, value: impl Into<Value>) -> String {
        let index = self.bound_counter;
        self.bound_counter += 1;
        self.params.insert(ParamKey::Index(index), value.into());
        self.mark_dirty();
        "?".to_string()
    }

    fn bind_named(&mut self, placeholder: &str, value: Value) {
        self.params.insert(ParamKey::from(placeholder), value);
        self.mark_dirty();
    }

    /// The parameter bag coerced into driver-acceptable scalars.
    ///
    /// Fails with [`QbError::Serialization`] when a bound object cannot be
    /// serialized.
    pub fn get_query_sql_parameters(&self) -> QbResult<SqlParams> {
        coerce_params(&self.params)
    }

    // ==================== Limits ====================

    /// Rows to skip; `0` emits no OFFSET.
    pub fn set_first_result(&mut self, first_result: u64) -> &mut Self {
        self.first_result = first_result;
        self.mark_dirty()
    }

    /// Row cap; `None` emits no LIMIT.
    pub fn set_max_results(&mut self, max_results: Option<u64>) -> &mut Self {
        self.max_results = max_results;
        self.mark_dirty()
    }

    // ==================== Resets ====================

    /// Restore one part to its default.
    pub fn reset_part(&mut self, part: QueryPart) -> &mut Self {
        self.parts.reset(part);
        self.mark_dirty()
    }

    /// Restore every part to its default.
    ///
    /// Parameters, limits and the statement type are kept.
    pub fn reset_parts(&mut self) -> &mut Self {
        self.parts = QueryParts::default();
        self.mark_dirty()
    }

    // ==================== Rendering ====================

    /// Render the statement, reusing the cached SQL while the builder is clean.
    ///
    /// On error the builder stays dirty and nothing is cached.
    pub fn get_sql(&mut self) -> QbResult<String> {
        if self.state == RenderState::Clean
            && let Some(sql) = &self.sql
        {
            return Ok(sql.clone());
        }

        let sql = self.to_sql()?;
        self.sql = Some(sql.clone());
        self.state = RenderState::Clean;
        Ok(sql)
    }

    /// Render the statement without touching the cache.
    pub fn to_sql(&self) -> QbResult<String> {
        let result = match self.statement_type {
            StatementType::Select => self.render_select(),
            StatementType::Insert => self.render_insert(),
            StatementType::Update => self.render_update(),
            StatementType::Delete => self.render_delete(),
        };

        match &result {
            Ok(sql) => tracing::trace!(
                target: "stmtkit.qb",
                statement = ?self.statement_type,
                sql_len = sql.len(),
                params = self.params.len(),
                "rendered statement"
            ),
            Err(err) => tracing::debug!(
                target: "stmtkit.qb",
                statement = ?self.statement_type,
                alias = err.alias(),
                error = %err,
                "statement build failed"
            ),
        }
        result
    }

    fn mark_dirty(&mut self) -> &mut Self {
        self.state = RenderState::Dirty;
        self.sql = None;
        self
    }

    /// Quote a column, table or alias name.
    ///
    /// Numeric literals and `*` are emitted as given.
    fn quote_column(&self, column: &str) -> String {
        if column.trim() == "*" || is_numeric(column) {
            column.to_string()
        } else {
            self.conn.quote_identifier(column)
        }
    }

    /// The single INSERT/UPDATE/DELETE target, rendered as `quoted[ alias]`.
    fn render_target(&self) -> QbResult<String> {
        let target = self
            .parts
            .from
            .first()
            .ok_or(QbError::MissingTarget(self.statement_type))?;

        let mut sql = self.quote_column(&target.table);
        if let Some(alias) = &target.alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        Ok(sql)
    }

    fn write_where(&self, sql: &mut String) {
        if let Some(predicate) = &self.parts.where_clause {
            sql.push_str(" WHERE ");
            predicate.write_sql(sql);
        }
    }
}
