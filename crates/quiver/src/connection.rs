//! Connection and prepared-statement traits.
//!
//! This is the crate's outbound boundary: the query layer renders SQL and
//! bound values, and hands both to whatever driver implements these traits.
//! A connection handle is lent per terminal call and never closed here;
//! statement cursors are scoped to one execute-fetch cycle and closed by the
//! executor as soon as the result set is materialized.

use crate::error::QueryResult;
use crate::row::Row;
use crate::value::{SqlType, Value};
use serde::Deserialize;
use std::future::Future;

/// The relational backend a connection speaks to.
///
/// Only affects the few places where dialects disagree (e.g. `truncate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    MySql,
    Sqlite,
}

/// A prepared statement scoped to a single execute-fetch cycle.
pub trait PreparedStatement: Send {
    /// Bind one positional parameter. `index` is 1-based, matching the
    /// left-to-right order of `?` placeholders in the statement text.
    fn bind_value(&mut self, index: usize, value: &Value, hint: SqlType) -> QueryResult<()>;

    /// Run the statement against the connection.
    fn execute(&mut self) -> impl Future<Output = QueryResult<()>> + Send;

    /// Materialize every result row. Only valid after [`execute`](Self::execute).
    fn fetch_all(&mut self) -> QueryResult<Vec<Row>>;

    /// Fetch the first column of the first result row, if any.
    fn fetch_column(&mut self) -> QueryResult<Option<Value>>;

    /// Rows affected by the last execution.
    fn row_count(&self) -> u64;

    /// Release the result cursor. Must be called once results are consumed.
    fn close_cursor(&mut self);
}

/// A prepared-statement-capable database connection.
///
/// Mirrors a classic driver surface: statement preparation, direct execution
/// for parameter-less DDL, last-insert-id, and transaction controls. All
/// methods borrow the connection; ownership stays with the caller.
pub trait Connection: Send + Sync {
    type Stmt: PreparedStatement;

    /// Which backend this connection speaks to.
    fn driver(&self) -> DriverKind;

    /// Prepare a statement for execution.
    fn prepare(&self, sql: &str) -> impl Future<Output = QueryResult<Self::Stmt>> + Send;

    /// Execute a parameter-less statement directly, returning affected rows.
    fn exec(&self, sql: &str) -> impl Future<Output = QueryResult<u64>> + Send;

    /// The id generated by the most recent insert on this connection.
    fn last_insert_id(&self) -> impl Future<Output = QueryResult<i64>> + Send;

    /// Open a transaction.
    fn begin_transaction(&self) -> impl Future<Output = QueryResult<()>> + Send;

    /// Commit the open transaction.
    fn commit(&self) -> impl Future<Output = QueryResult<()>> + Send;

    /// Roll back the open transaction.
    fn rollback(&self) -> impl Future<Output = QueryResult<()>> + Send;

    /// Whether a transaction is currently open.
    fn in_transaction(&self) -> bool;
}
