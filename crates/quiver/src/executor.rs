//! Terminal operations: render, bind, execute, reshape.
//!
//! Builder-state errors are raised before any SQL reaches the driver; driver
//! errors propagate unmodified with the operation and table attached for
//! diagnosability. No operation retries. Statement cursors are closed as soon
//! as the result set is materialized.

use crate::binder;
use crate::builder::QueryBuilder;
use crate::config::SanitizeMode;
use crate::connection::{Connection, DriverKind, PreparedStatement};
use crate::error::{QueryError, QueryResult};
use crate::row::{FromRow, Row};
use crate::value::Value;
use tracing::debug;

/// Aggregate function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agg {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Agg {
    fn as_sql(&self) -> &'static str {
        match self {
            Agg::Count => "count",
            Agg::Sum => "sum",
            Agg::Avg => "avg",
            Agg::Min => "min",
            Agg::Max => "max",
        }
    }
}

/// Result of an aggregate execution.
///
/// An un-grouped aggregate yields a single scalar; a grouped one yields the
/// full row set, one row per group.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Scalar(Value),
    Rows(Vec<Row>),
}

impl QueryBuilder {
    // ==================== Fetch paths ====================

    /// Execute the accumulated query and return all rows.
    pub async fn get<C: Connection>(&mut self, conn: &C) -> QueryResult<Vec<Row>> {
        let (sql, bindings) = self.render_select();
        self.execute_fetch(conn, &sql, &bindings, "get").await
    }

    /// Execute and map all rows to `T`.
    pub async fn get_as<T: FromRow, C: Connection>(&mut self, conn: &C) -> QueryResult<Vec<T>> {
        let rows = self.get(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute with `take(1)` and return the first row, if any.
    pub async fn first<C: Connection>(&mut self, conn: &C) -> QueryResult<Option<Row>> {
        self.take(1);
        let rows = self.get(conn).await?;
        Ok(rows.into_iter().next())
    }

    /// Execute with `take(1)` and map the first row to `T`, if any.
    pub async fn first_as<T: FromRow, C: Connection>(
        &mut self,
        conn: &C,
    ) -> QueryResult<Option<T>> {
        let row = self.first(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Return the last row matching the accumulated predicates, located by
    /// offsetting to `count - 1`.
    ///
    /// Returns `Ok(None)` when no row matches; the offset is never allowed
    /// to go negative.
    pub async fn last<C: Connection>(&mut self, conn: &C) -> QueryResult<Option<Row>> {
        let total = self.clone().count(conn).await?;
        if total == 0 {
            self.reset_clauses();
            return Ok(None);
        }
        self.jump(total - 1).take(1);
        self.first(conn).await
    }

    // ==================== Mutations ====================

    /// Execute `update … set …` over the accumulated where clause.
    ///
    /// SET values are bound before the predicate bindings, matching
    /// placeholder order. Returns the affected-row count.
    pub async fn update<C: Connection>(
        &mut self,
        conn: &C,
        changes: &[(&str, Value)],
    ) -> QueryResult<u64> {
        let (sql, bindings) = self.render_update(changes)?;
        self.execute_affected(conn, &sql, &bindings, "update").await
    }

    /// Execute `delete from …` over the accumulated where clause.
    pub async fn delete<C: Connection>(&mut self, conn: &C) -> QueryResult<u64> {
        let (sql, bindings) = self.render_delete();
        self.execute_affected(conn, &sql, &bindings, "delete").await
    }

    /// Insert a single row. Returns the affected-row count.
    pub async fn insert<C: Connection>(
        &mut self,
        conn: &C,
        row: &[(&str, Value)],
    ) -> QueryResult<u64> {
        let (sql, bindings) = self.render_insert(row)?;
        let affected = self.execute_affected(conn, &sql, &bindings, "insert").await?;
        self.reset_clauses();
        Ok(affected)
    }

    /// Insert several rows, one executed statement per row, and return the
    /// total affected-row count.
    pub async fn insert_many<C: Connection>(
        &mut self,
        conn: &C,
        rows: &[Vec<(&str, Value)>],
    ) -> QueryResult<u64> {
        let mut affected = 0;
        for row in rows {
            let (sql, bindings) = self.render_insert(row)?;
            affected += self.execute_affected(conn, &sql, &bindings, "insert").await?;
        }
        self.reset_clauses();
        Ok(affected)
    }

    /// Insert a single row and return the id the connection generated for it.
    pub async fn insert_and_get_id<C: Connection>(
        &mut self,
        conn: &C,
        row: &[(&str, Value)],
    ) -> QueryResult<i64> {
        self.insert(conn, row).await?;
        conn.last_insert_id()
            .await
            .map_err(|e| e.with_context("insert", self.table_name()))
    }

    /// Execute `update … set column = column + step` over the where clause.
    pub async fn increment<C: Connection>(
        &mut self,
        conn: &C,
        column: &str,
        step: i64,
    ) -> QueryResult<u64> {
        let (sql, bindings) = self.render_increment(column, step)?;
        self.execute_affected(conn, &sql, &bindings, "increment").await
    }

    /// Execute `update … set column = column - step` over the where clause.
    pub async fn decrement<C: Connection>(
        &mut self,
        conn: &C,
        column: &str,
        step: i64,
    ) -> QueryResult<u64> {
        let (sql, bindings) = self.render_increment(column, step.saturating_neg())?;
        self.execute_affected(conn, &sql, &bindings, "decrement").await
    }

    /// Empty the table. Runs directly, without a prepared statement.
    ///
    /// SQLite has no TRUNCATE; an unfiltered DELETE is issued instead.
    pub async fn truncate<C: Connection>(&mut self, conn: &C) -> QueryResult<u64> {
        self.reset_clauses();
        let sql = match conn.driver() {
            DriverKind::MySql => format!("truncate table {}", self.table_name()),
            DriverKind::Sqlite => format!("delete from {}", self.table_name()),
        };
        debug!(table = self.table_name(), sql = sql.as_str(), "executing statement");
        conn.exec(&sql)
            .await
            .map_err(|e| e.with_context("truncate", self.table_name()))
    }

    // ==================== Aggregates ====================

    /// Execute `select count(*) …` over the accumulated predicates.
    pub async fn count<C: Connection>(&mut self, conn: &C) -> QueryResult<u64> {
        if self.is_grouped() {
            return Err(QueryError::data_shape(
                "count() on a grouped query returns one row per group; use aggregate()",
            ));
        }
        let (sql, bindings) = self.render_aggregate("count", "*")?;
        let rows = self.execute_fetch(conn, &sql, &bindings, "count").await?;
        let row = rows
            .first()
            .ok_or_else(|| QueryError::data_shape("count query returned no rows"))?;
        match row.first_value() {
            Some(Value::Int(n)) if *n >= 0 => Ok(*n as u64),
            other => Err(QueryError::data_shape(format!(
                "count query returned a non-integer value: {other:?}"
            ))),
        }
    }

    /// Execute an aggregate function over the accumulated predicates.
    ///
    /// Grouped queries return [`Aggregate::Rows`]; un-grouped ones return
    /// [`Aggregate::Scalar`] (NULL when the table is empty, as SQL defines
    /// for sum/avg/min/max).
    pub async fn aggregate<C: Connection>(
        &mut self,
        conn: &C,
        func: Agg,
        column: &str,
    ) -> QueryResult<Aggregate> {
        let (sql, bindings) = self.render_aggregate(func.as_sql(), column)?;
        let rows = self.execute_fetch(conn, &sql, &bindings, "aggregate").await?;
        if rows.len() > 1 {
            return Ok(Aggregate::Rows(rows));
        }
        let scalar = match rows.into_iter().next() {
            Some(row) => row.first_value().cloned().unwrap_or(Value::Null),
            None => Value::Null,
        };
        Ok(Aggregate::Scalar(scalar))
    }

    // ==================== Shared execution plumbing ====================

    pub(crate) async fn execute_fetch<C: Connection>(
        &self,
        conn: &C,
        sql: &str,
        bindings: &[Value],
        operation: &'static str,
    ) -> QueryResult<Vec<Row>> {
        let table = self.table_name();
        debug!(table, sql, bindings = bindings.len(), "executing statement");
        let mut stmt = conn
            .prepare(sql)
            .await
            .map_err(|e| e.with_context(operation, table))?;
        binder::bind(&mut stmt, bindings).map_err(|e| e.with_context(operation, table))?;
        stmt.execute()
            .await
            .map_err(|e| e.with_context(operation, table))?;
        let rows = stmt
            .fetch_all()
            .map_err(|e| e.with_context(operation, table))?;
        stmt.close_cursor();
        if self.sanitize_mode() == SanitizeMode::Html {
            return Ok(rows.into_iter().map(Row::sanitize_html).collect());
        }
        Ok(rows)
    }

    async fn execute_affected<C: Connection>(
        &self,
        conn: &C,
        sql: &str,
        bindings: &[Value],
        operation: &'static str,
    ) -> QueryResult<u64> {
        let table = self.table_name();
        debug!(table, sql, bindings = bindings.len(), "executing statement");
        let mut stmt = conn
            .prepare(sql)
            .await
            .map_err(|e| e.with_context(operation, table))?;
        binder::bind(&mut stmt, bindings).map_err(|e| e.with_context(operation, table))?;
        stmt.execute()
            .await
            .map_err(|e| e.with_context(operation, table))?;
        let affected = stmt.row_count();
        stmt.close_cursor();
        Ok(affected)
    }
}
