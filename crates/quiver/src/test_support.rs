//! Scripted connection doubles for exercising terminal operations.
//!
//! `MockConnection` replays a queue of scripted outcomes, one per prepared
//! statement, and records every executed statement with its bound values so
//! tests can assert on the exact SQL and binding order that reached the
//! driver boundary.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::connection::{Connection, DriverKind, PreparedStatement};
use crate::error::{QueryError, QueryResult};
use crate::row::Row;
use crate::value::{SqlType, Value};

/// One scripted statement outcome.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Rows(Vec<Row>),
    Affected(u64),
    Fail {
        code: &'static str,
        message: &'static str,
    },
}

/// A statement as it reached the driver: final SQL text plus bound values in
/// placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExecutedStatement {
    pub sql: String,
    pub bindings: Vec<Value>,
}

pub(crate) struct MockConnection {
    driver: DriverKind,
    script: Mutex<VecDeque<Scripted>>,
    log: Arc<Mutex<Vec<ExecutedStatement>>>,
    last_insert_id: i64,
    in_tx: Mutex<bool>,
}

impl MockConnection {
    pub fn new(driver: DriverKind) -> Self {
        Self {
            driver,
            script: Mutex::new(VecDeque::new()),
            log: Arc::new(Mutex::new(Vec::new())),
            last_insert_id: 0,
            in_tx: Mutex::new(false),
        }
    }

    pub fn mysql() -> Self {
        Self::new(DriverKind::MySql)
    }

    pub fn sqlite() -> Self {
        Self::new(DriverKind::Sqlite)
    }

    /// Queue one outcome for the next prepared statement.
    pub fn script(self, outcome: Scripted) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = id;
        self
    }

    /// Everything executed so far, in order.
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.log.lock().unwrap().clone()
    }

    fn next_outcome(&self) -> Scripted {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Rows(Vec::new()))
    }
}

pub(crate) struct MockStatement {
    sql: String,
    bindings: Vec<Value>,
    outcome: Scripted,
    log: Arc<Mutex<Vec<ExecutedStatement>>>,
    rows: Vec<Row>,
    affected: u64,
}

impl PreparedStatement for MockStatement {
    fn bind_value(&mut self, index: usize, value: &Value, _hint: SqlType) -> QueryResult<()> {
        if index != self.bindings.len() + 1 {
            return Err(QueryError::driver(
                "HY093",
                format!("out-of-order bind index {index}"),
            ));
        }
        self.bindings.push(value.clone());
        Ok(())
    }

    async fn execute(&mut self) -> QueryResult<()> {
        self.log.lock().unwrap().push(ExecutedStatement {
            sql: self.sql.clone(),
            bindings: self.bindings.clone(),
        });
        match std::mem::replace(&mut self.outcome, Scripted::Rows(Vec::new())) {
            Scripted::Rows(rows) => {
                self.affected = rows.len() as u64;
                self.rows = rows;
                Ok(())
            }
            Scripted::Affected(n) => {
                self.affected = n;
                Ok(())
            }
            Scripted::Fail { code, message } => Err(QueryError::driver(code, message)),
        }
    }

    fn fetch_all(&mut self) -> QueryResult<Vec<Row>> {
        Ok(std::mem::take(&mut self.rows))
    }

    fn fetch_column(&mut self) -> QueryResult<Option<Value>> {
        Ok(self
            .rows
            .first()
            .and_then(|row| row.first_value().cloned()))
    }

    fn row_count(&self) -> u64 {
        self.affected
    }

    fn close_cursor(&mut self) {
        self.rows.clear();
    }
}

impl Connection for MockConnection {
    type Stmt = MockStatement;

    fn driver(&self) -> DriverKind {
        self.driver
    }

    async fn prepare(&self, sql: &str) -> QueryResult<MockStatement> {
        Ok(MockStatement {
            sql: sql.to_string(),
            bindings: Vec::new(),
            outcome: self.next_outcome(),
            log: Arc::clone(&self.log),
            rows: Vec::new(),
            affected: 0,
        })
    }

    async fn exec(&self, sql: &str) -> QueryResult<u64> {
        self.log.lock().unwrap().push(ExecutedStatement {
            sql: sql.to_string(),
            bindings: Vec::new(),
        });
        match self.next_outcome() {
            Scripted::Rows(rows) => Ok(rows.len() as u64),
            Scripted::Affected(n) => Ok(n),
            Scripted::Fail { code, message } => Err(QueryError::driver(code, message)),
        }
    }

    async fn last_insert_id(&self) -> QueryResult<i64> {
        Ok(self.last_insert_id)
    }

    async fn begin_transaction(&self) -> QueryResult<()> {
        *self.in_tx.lock().unwrap() = true;
        Ok(())
    }

    async fn commit(&self) -> QueryResult<()> {
        *self.in_tx.lock().unwrap() = false;
        Ok(())
    }

    async fn rollback(&self) -> QueryResult<()> {
        *self.in_tx.lock().unwrap() = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        *self.in_tx.lock().unwrap()
    }
}

/// Build a row from (column, value) pairs. Test convenience.
pub(crate) fn row(pairs: &[(&str, Value)]) -> Row {
    Row::from_pairs(
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    )
}

/// `count(*)` result rows as a driver would return them.
pub(crate) fn count_rows(n: i64) -> Vec<Row> {
    vec![row(&[("count(*)", Value::Int(n))])]
}
