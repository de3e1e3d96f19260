//! Positional parameter binding.
//!
//! The binder walks the ordered binding list produced by the clause
//! accumulator and hands each value to the prepared statement with the type
//! hint carried by its [`Value`] variant. There is no inference step: the
//! tag chosen at the call site is the bind type, and `Null` is bound as an
//! explicit typed null.

use crate::connection::PreparedStatement;
use crate::error::QueryResult;
use crate::value::Value;

/// Bind `values` to `stmt` as 1-based positional parameters.
///
/// The slice order must match the left-to-right `?` placeholder order of the
/// statement text; the builder guarantees this by pushing fragment and
/// binding together.
pub fn bind<S: PreparedStatement>(stmt: &mut S, values: &[Value]) -> QueryResult<()> {
    for (i, value) in values.iter().enumerate() {
        stmt.bind_value(i + 1, value, value.type_hint())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::row::Row;
    use crate::value::SqlType;

    #[derive(Default)]
    struct RecordingStatement {
        bound: Vec<(usize, Value, SqlType)>,
    }

    impl PreparedStatement for RecordingStatement {
        fn bind_value(&mut self, index: usize, value: &Value, hint: SqlType) -> QueryResult<()> {
            self.bound.push((index, value.clone(), hint));
            Ok(())
        }

        async fn execute(&mut self) -> QueryResult<()> {
            Ok(())
        }

        fn fetch_all(&mut self) -> QueryResult<Vec<Row>> {
            Ok(Vec::new())
        }

        fn fetch_column(&mut self) -> QueryResult<Option<Value>> {
            Ok(None)
        }

        fn row_count(&self) -> u64 {
            0
        }

        fn close_cursor(&mut self) {}
    }

    #[test]
    fn binds_in_order_with_variant_hints() {
        let mut stmt = RecordingStatement::default();
        bind(
            &mut stmt,
            &[
                Value::Int(1),
                Value::Text("x".into()),
                Value::Bool(true),
                Value::Null,
            ],
        )
        .unwrap();
        assert_eq!(
            stmt.bound,
            vec![
                (1, Value::Int(1), SqlType::Int),
                (2, Value::Text("x".into()), SqlType::Text),
                (3, Value::Bool(true), SqlType::Bool),
                (4, Value::Null, SqlType::Null),
            ]
        );
    }

    struct FailingStatement;

    impl PreparedStatement for FailingStatement {
        fn bind_value(&mut self, index: usize, _: &Value, _: SqlType) -> QueryResult<()> {
            Err(QueryError::driver("HY093", format!("bad index {index}")))
        }

        async fn execute(&mut self) -> QueryResult<()> {
            Ok(())
        }

        fn fetch_all(&mut self) -> QueryResult<Vec<Row>> {
            Ok(Vec::new())
        }

        fn fetch_column(&mut self) -> QueryResult<Option<Value>> {
            Ok(None)
        }

        fn row_count(&self) -> u64 {
            0
        }

        fn close_cursor(&mut self) {}
    }

    #[test]
    fn bind_errors_propagate() {
        let mut stmt = FailingStatement;
        let err = bind(&mut stmt, &[Value::Int(1)]).unwrap_err();
        assert!(err.is_driver());
    }
}
