//! SELECT parts and rendering.

use super::QueryBuilder;
use crate::client::Connection;
use crate::error::QbResult;
use crate::qb::parts::{FromTarget, StatementType};

fn strings<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl<C: Connection> QueryBuilder<C> {
    // ==================== SELECT list ====================

    /// Replace the select list and switch to a SELECT statement.
    ///
    /// An empty `columns` leaves the list untouched, as does a locked builder
    /// whose list is already non-empty.
    pub fn select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.statement_type = StatementType::Select;
        self.mark_dirty();
        if self.projection_guarded() {
            return self;
        }
        let columns = strings(columns);
        if !columns.is_empty() {
            self.parts.select = columns;
        }
        self
    }

    /// Append to the select list and switch to a SELECT statement.
    ///
    /// Same lock rule as [`select`](Self::select).
    pub fn add_select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.statement_type = StatementType::Select;
        self.mark_dirty();
        if self.projection_guarded() {
            return self;
        }
        self.parts.select.extend(strings(columns));
        self
    }

    fn projection_guarded(&self) -> bool {
        self.select_locked && !self.parts.select.is_empty()
    }

    /// Emit `SELECT DISTINCT`.
    ///
    /// `reset_part(QueryPart::Distinct)` turns it off again.
    pub fn distinct(&mut self) -> &mut Self {
        self.parts.distinct = true;
        self.mark_dirty()
    }

    // ==================== FROM ====================

    /// Add an unaliased FROM source.
    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.parts.from.push(FromTarget::new(table, None));
        self.mark_dirty()
    }

    /// Add an aliased FROM source.
    pub fn from_as(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.parts
            .from
            .push(FromTarget::new(table, Some(alias.into())));
        self.mark_dirty()
    }

    // ==================== GROUP BY / ORDER BY ====================

    /// Replace the GROUP BY list. An empty list leaves it untouched.
    pub fn group_by<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let columns = strings(columns);
        if columns.is_empty() {
            return self;
        }
        self.parts.group_by = columns;
        self.mark_dirty()
    }

    /// Append to the GROUP BY list.
    pub fn add_group_by<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let columns = strings(columns);
        if columns.is_empty() {
            return self;
        }
        self.parts.group_by.extend(columns);
        self.mark_dirty()
    }

    /// Replace the ordering with `sort [order]`; the direction defaults to `ASC`.
    pub fn order_by(&mut self, sort: &str, order: Option<&str>) -> &mut Self {
        self.parts.order_by = vec![order_item(sort, order)];
        self.mark_dirty()
    }

    /// Append `sort [order]` to the ordering.
    pub fn add_order_by(&mut self, sort: &str, order: Option<&str>) -> &mut Self {
        self.parts.order_by.push(order_item(sort, order));
        self.mark_dirty()
    }

    // ==================== Rendering ====================

    pub(super) fn render_select(&self) -> QbResult<String> {
        let mut sql = String::from("SELECT ");
        if self.parts.distinct {
            sql.push_str("DISTINCT ");
        }

        let columns: Vec<String> = self
            .parts
            .select
            .iter()
            .map(|c| self.quote_column(c))
            .collect();
        sql.push_str(&columns.join(", "));

        if !self.parts.from.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&self.from_clauses()?.join(", "));
        }

        self.write_where(&mut sql);

        if !self.parts.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.parts.group_by.join(", "));
        }

        if let Some(having) = &self.parts.having {
            sql.push_str(" HAVING ");
            having.write_sql(&mut sql);
        }

        if !self.parts.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.parts.order_by.join(", "));
        }

        if let Some(limit) = self.max_results {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if self.first_result > 0 {
            sql.push_str(&format!(" OFFSET {}", self.first_result));
        }

        Ok(sql)
    }
}

fn order_item(sort: &str, order: Option<&str>) -> String {
    format!("{sort} {}", order.unwrap_or("ASC"))
}
