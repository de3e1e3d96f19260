//! The fluent query builder.
//!
//! A [`QueryBuilder`] is created per logical query, mutated through fluent
//! clause calls, and consumed exactly once by a terminal operation. Rendering
//! drains every single-use clause: after `to_sql()` (or any terminal op) the
//! builder is back to a clean `select * from <table>` slate, retaining only
//! the table name and configuration. It is a fresh-per-call-chain value, not
//! a long-lived one.
//!
//! Clause text and bind values are pushed by the same helper, so the binding
//! vector always matches the `?` placeholders left-to-right.
//!
//! # Example
//!
//! ```ignore
//! let mut q = QueryBuilder::table("users")?;
//! q.select(&["id", "name"])
//!     .where_eq("status", "active")?
//!     .order_by("created_at", Direction::Desc)?
//!     .take(20);
//! let rows = q.get(&conn).await?;
//! ```

mod conditions;
mod predicate;

pub use predicate::{Connective, Direction, JoinKind, Op, Operand};

use crate::config::{BuilderConfig, ClauseOrder, SanitizeMode};
use crate::error::{QueryError, QueryResult};
use crate::ident;
use crate::value::Value;

/// Mutable per-query builder state.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    clause_order: ClauseOrder,
    sanitize: SanitizeMode,

    // Single-use clause fields, drained on render.
    select_clause: Option<String>,
    select_bindings: Vec<Value>,
    join_clause: Option<String>,
    where_clause: Option<String>,
    where_bindings: Vec<Value>,
    group_clause: Option<String>,
    having_clause: Option<String>,
    having_bindings: Vec<Value>,
    order_clause: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl QueryBuilder {
    /// Create a builder targeting `table`.
    pub fn table(name: &str) -> QueryResult<Self> {
        Self::with_config(name, &BuilderConfig::default())
    }

    /// Create a builder targeting `table`, applying the configured table
    /// prefix, clause-order compatibility flag and sanitize mode.
    pub fn with_config(name: &str, config: &BuilderConfig) -> QueryResult<Self> {
        let table = match &config.table_prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        };
        ident::validate(&table)?;
        Ok(Self {
            table,
            clause_order: config.clause_order,
            sanitize: config.sanitize,
            select_clause: None,
            select_bindings: Vec::new(),
            join_clause: None,
            where_clause: None,
            where_bindings: Vec::new(),
            group_clause: None,
            having_clause: None,
            having_bindings: Vec::new(),
            order_clause: None,
            limit: None,
            offset: None,
        })
    }

    /// The (prefixed) table this builder targets.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub(crate) fn sanitize_mode(&self) -> SanitizeMode {
        self.sanitize
    }

    // ==================== SELECT columns ====================

    /// Set the select list. Empty slice is a no-op; `["*"]` resets to `*`.
    ///
    /// Columns are taken verbatim so expressions (`count(*) as c`) are
    /// allowed; do not pass untrusted input here.
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        if columns == ["*"] {
            self.select_clause = None;
            return self;
        }
        self.select_clause = Some(columns.join(", "));
        self
    }

    /// Append a sub-query to the select list as `(select …) as alias`.
    pub fn select_sub(&mut self, mut sub: QueryBuilder, alias: &str) -> QueryResult<&mut Self> {
        ident::validate(alias)?;
        let (sql, bindings) = sub.render_select();
        let fragment = format!("({sql}) as {alias}");
        match &mut self.select_clause {
            None => self.select_clause = Some(fragment),
            Some(s) => {
                s.push_str(", ");
                s.push_str(&fragment);
            }
        }
        self.select_bindings.extend(bindings);
        Ok(self)
    }

    /// Select distinct values of one column.
    ///
    /// Replaces any select list set earlier; `distinct` and an explicit
    /// column list do not combine.
    pub fn distinct(&mut self, column: &str) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        self.select_clause = Some(format!("distinct {column}"));
        Ok(self)
    }

    // ==================== JOIN ====================

    /// Inner join with an implied `=` comparison.
    pub fn join(&mut self, table: &str, left: &str, right: &str) -> QueryResult<&mut Self> {
        self.join_on(JoinKind::Inner, table, left, Op::Eq, right)
    }

    /// Left join with an implied `=` comparison.
    pub fn left_join(&mut self, table: &str, left: &str, right: &str) -> QueryResult<&mut Self> {
        self.join_on(JoinKind::Left, table, left, Op::Eq, right)
    }

    /// Right join with an implied `=` comparison.
    pub fn right_join(&mut self, table: &str, left: &str, right: &str) -> QueryResult<&mut Self> {
        self.join_on(JoinKind::Right, table, left, Op::Eq, right)
    }

    /// Join with an explicit kind and comparison operator.
    pub fn join_on(
        &mut self,
        kind: JoinKind,
        table: &str,
        left: &str,
        op: Op,
        right: &str,
    ) -> QueryResult<&mut Self> {
        ident::validate(table)?;
        ident::validate(left)?;
        ident::validate(right)?;
        let fragment = format!("{} {table} on {left} {} {right}", kind.as_sql(), op.as_sql());
        match &mut self.join_clause {
            None => self.join_clause = Some(fragment),
            Some(j) => {
                j.push(' ');
                j.push_str(&fragment);
            }
        }
        Ok(self)
    }

    /// Extend the most recent join's `on` clause with an `and` condition.
    pub fn and_on(&mut self, left: &str, op: Op, right: &str) -> QueryResult<&mut Self> {
        self.push_on(Connective::And, left, op, right)
    }

    /// Extend the most recent join's `on` clause with an `or` condition.
    pub fn or_on(&mut self, left: &str, op: Op, right: &str) -> QueryResult<&mut Self> {
        self.push_on(Connective::Or, left, op, right)
    }

    fn push_on(
        &mut self,
        connective: Connective,
        left: &str,
        op: Op,
        right: &str,
    ) -> QueryResult<&mut Self> {
        ident::validate(left)?;
        ident::validate(right)?;
        let Some(join) = &mut self.join_clause else {
            return Err(QueryError::builder(
                "on() requires a join clause to extend; call join() first",
            ));
        };
        join.push_str(&format!(
            " {} {left} {} {right}",
            connective.as_sql(),
            op.as_sql()
        ));
        Ok(self)
    }

    // ==================== GROUP / HAVING ====================

    /// Group results by a column.
    pub fn group(&mut self, column: &str) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        self.group_clause = Some(column.to_string());
        Ok(self)
    }

    /// Add a having predicate, `and`-combined with any existing one.
    ///
    /// The value is parameter-bound, never interpolated.
    pub fn having(&mut self, column: &str, op: Op, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push_having(Connective::And, column, op, value.into())
    }

    /// Add a having predicate with an `or` connective.
    pub fn or_having(
        &mut self,
        column: &str,
        op: Op,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        if self.having_clause.is_none() {
            return Err(QueryError::builder(
                "or_having called before any having clause exists",
            ));
        }
        self.push_having(Connective::Or, column, op, value.into())
    }

    fn push_having(
        &mut self,
        connective: Connective,
        column: &str,
        op: Op,
        value: Value,
    ) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        let fragment = format!("({column} {} ?)", op.as_sql());
        match &mut self.having_clause {
            None => self.having_clause = Some(fragment),
            Some(h) => {
                h.push_str(&format!(" {} ", connective.as_sql()));
                h.push_str(&fragment);
            }
        }
        self.having_bindings.push(value);
        Ok(self)
    }

    // ==================== ORDER / LIMIT ====================

    /// Order by a column; repeated calls accumulate comma-separated.
    pub fn order_by(&mut self, column: &str, direction: Direction) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        let pair = format!("{column} {}", direction.as_sql());
        match &mut self.order_clause {
            None => self.order_clause = Some(pair),
            Some(o) => {
                o.push_str(", ");
                o.push_str(&pair);
            }
        }
        Ok(self)
    }

    /// Limit the number of returned rows.
    pub fn take(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Skip `offset` rows. Rendered only together with a limit.
    ///
    /// Limit and offset are independent fields: `take(10).jump(20)` and
    /// `jump(20).take(10)` both render `limit 20, 10`.
    pub fn jump(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    // ==================== Rendering ====================

    /// Render the SELECT statement and reset all single-use clauses.
    ///
    /// A second call without intervening clause calls yields
    /// `select * from <table>`.
    pub fn to_sql(&mut self) -> String {
        self.render_select().0
    }

    /// Render the SELECT statement plus its bindings in placeholder order
    /// (select-list bindings, then where, then having), consuming the
    /// clause state.
    pub(crate) fn render_select(&mut self) -> (String, Vec<Value>) {
        let mut sql = String::from("select ");
        match self.select_clause.take() {
            Some(cols) => sql.push_str(&cols),
            None => sql.push('*'),
        }
        sql.push_str(" from ");
        sql.push_str(&self.table);

        if let Some(join) = self.join_clause.take() {
            sql.push(' ');
            sql.push_str(&join);
        }
        if let Some(where_clause) = self.where_clause.take() {
            sql.push_str(" where ");
            sql.push_str(&where_clause);
        }

        match self.clause_order {
            ClauseOrder::Standard => {
                self.append_group_having(&mut sql);
                self.append_order(&mut sql);
                self.append_limit(&mut sql);
            }
            ClauseOrder::Legacy => {
                self.append_order(&mut sql);
                self.append_limit(&mut sql);
                self.append_group_having(&mut sql);
            }
        }

        let mut bindings = std::mem::take(&mut self.select_bindings);
        bindings.append(&mut self.where_bindings);
        bindings.append(&mut self.having_bindings);
        self.reset_clauses();
        (sql, bindings)
    }

    fn append_group_having(&mut self, sql: &mut String) {
        let Some(group) = self.group_clause.take() else {
            // A having clause without a group has nowhere to render; its
            // bindings go with it so placeholders and bindings stay in step.
            self.having_clause = None;
            self.having_bindings.clear();
            return;
        };
        sql.push_str(" group by ");
        sql.push_str(&group);
        if let Some(having) = self.having_clause.take() {
            sql.push_str(" having ");
            sql.push_str(&having);
        }
    }

    fn append_order(&mut self, sql: &mut String) {
        if let Some(order) = self.order_clause.take() {
            sql.push_str(" order by ");
            sql.push_str(&order);
        }
    }

    fn append_limit(&mut self, sql: &mut String) {
        // An offset without a limit has nothing to attach to and is dropped.
        if let Some(limit) = self.limit.take() {
            match self.offset.take() {
                Some(offset) => sql.push_str(&format!(" limit {offset}, {limit}")),
                None => sql.push_str(&format!(" limit {limit}")),
            }
        }
    }

    /// Render `update … set …[ where …]`.
    ///
    /// Binding order is SET values first, then the where bindings, matching
    /// the placeholder order of the rendered text.
    pub(crate) fn render_update(
        &mut self,
        changes: &[(&str, Value)],
    ) -> QueryResult<(String, Vec<Value>)> {
        if changes.is_empty() {
            return Err(QueryError::builder("update requires at least one column"));
        }
        let mut assignments = Vec::with_capacity(changes.len());
        let mut bindings = Vec::with_capacity(changes.len() + self.where_bindings.len());
        for (column, value) in changes {
            ident::validate(column)?;
            assignments.push(format!("{column} = ?"));
            bindings.push(value.clone());
        }
        let mut sql = format!("update {} set {}", self.table, assignments.join(", "));
        self.append_where(&mut sql);
        bindings.append(&mut self.where_bindings);
        self.reset_clauses();
        Ok((sql, bindings))
    }

    /// Render `update … set column = column + ?[ where …]`.
    pub(crate) fn render_increment(
        &mut self,
        column: &str,
        step: i64,
    ) -> QueryResult<(String, Vec<Value>)> {
        ident::validate(column)?;
        let mut sql = format!("update {} set {column} = {column} + ?", self.table);
        self.append_where(&mut sql);
        let mut bindings = vec![Value::Int(step)];
        bindings.append(&mut self.where_bindings);
        self.reset_clauses();
        Ok((sql, bindings))
    }

    /// Render `delete from …[ where …]`.
    pub(crate) fn render_delete(&mut self) -> (String, Vec<Value>) {
        let mut sql = format!("delete from {}", self.table);
        self.append_where(&mut sql);
        let bindings = std::mem::take(&mut self.where_bindings);
        self.reset_clauses();
        (sql, bindings)
    }

    /// Render a single-row `insert into … (…) values (…)`.
    pub(crate) fn render_insert(
        &self,
        row: &[(&str, Value)],
    ) -> QueryResult<(String, Vec<Value>)> {
        if row.is_empty() {
            return Err(QueryError::builder("insert requires at least one column"));
        }
        let mut columns = Vec::with_capacity(row.len());
        let mut bindings = Vec::with_capacity(row.len());
        for (column, value) in row {
            ident::validate(column)?;
            columns.push(*column);
            bindings.push(value.clone());
        }
        let placeholders = vec!["?"; row.len()].join(", ");
        let sql = format!(
            "insert into {} ({}) values ({placeholders})",
            self.table,
            columns.join(", ")
        );
        Ok((sql, bindings))
    }

    /// Render `select <func>(<column>) from …` over the accumulated join,
    /// where, group and having clauses. This path is independent of
    /// [`render_select`](Self::render_select) but consumes the same state.
    pub(crate) fn render_aggregate(
        &mut self,
        func: &'static str,
        column: &str,
    ) -> QueryResult<(String, Vec<Value>)> {
        ident::validate_column(column)?;
        let mut sql = format!("select {func}({column}) from {}", self.table);
        if let Some(join) = self.join_clause.take() {
            sql.push(' ');
            sql.push_str(&join);
        }
        self.append_where(&mut sql);
        self.append_group_having(&mut sql);
        let mut bindings = std::mem::take(&mut self.where_bindings);
        bindings.append(&mut self.having_bindings);
        self.reset_clauses();
        Ok((sql, bindings))
    }

    fn append_where(&mut self, sql: &mut String) {
        if let Some(where_clause) = self.where_clause.take() {
            sql.push_str(" where ");
            sql.push_str(&where_clause);
        }
    }

    /// Return the builder to a clean clause slate, keeping table and config.
    pub(crate) fn reset_clauses(&mut self) {
        self.select_clause = None;
        self.select_bindings.clear();
        self.join_clause = None;
        self.where_clause = None;
        self.where_bindings.clear();
        self.group_clause = None;
        self.having_clause = None;
        self.having_bindings.clear();
        self.order_clause = None;
        self.limit = None;
        self.offset = None;
    }

    pub(crate) fn is_grouped(&self) -> bool {
        self.group_clause.is_some()
    }
}
