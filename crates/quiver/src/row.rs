//! Result rows and typed mapping.
//!
//! Drivers materialize each fetched record as a [`Row`]: an ordered sequence
//! of column name / [`Value`] pairs. Typed access returns a `DataShape` error
//! instead of a silent default when a column is missing or has the wrong type.

use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One fetched record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from column/value pairs, preserving order.
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self { columns: pairs }
    }

    /// Append a column.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate column names and values in fetch order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a column by name, erroring when absent.
    pub fn try_get(&self, name: &str) -> QueryResult<&Value> {
        self.get(name)
            .ok_or_else(|| QueryError::data_shape(format!("missing column '{name}'")))
    }

    /// Read an integer column.
    pub fn get_int(&self, name: &str) -> QueryResult<i64> {
        self.try_get(name)?
            .as_int()
            .ok_or_else(|| type_mismatch(name, "int"))
    }

    /// Read a float column.
    pub fn get_float(&self, name: &str) -> QueryResult<f64> {
        self.try_get(name)?
            .as_float()
            .ok_or_else(|| type_mismatch(name, "float"))
    }

    /// Read a boolean column.
    pub fn get_bool(&self, name: &str) -> QueryResult<bool> {
        self.try_get(name)?
            .as_bool()
            .ok_or_else(|| type_mismatch(name, "bool"))
    }

    /// Read a text column.
    pub fn get_text(&self, name: &str) -> QueryResult<&str> {
        self.try_get(name)?
            .as_text()
            .ok_or_else(|| type_mismatch(name, "text"))
    }

    /// Read a nullable integer column.
    pub fn get_int_opt(&self, name: &str) -> QueryResult<Option<i64>> {
        let value = self.try_get(name)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_int()
            .map(Some)
            .ok_or_else(|| type_mismatch(name, "int"))
    }

    /// Read a nullable text column.
    pub fn get_text_opt(&self, name: &str) -> QueryResult<Option<&str>> {
        let value = self.try_get(name)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_text()
            .map(Some)
            .ok_or_else(|| type_mismatch(name, "text"))
    }

    /// First column value, used by scalar fetch paths.
    pub(crate) fn first_value(&self) -> Option<&Value> {
        self.columns.first().map(|(_, v)| v)
    }

    /// Apply HTML-defensive escaping to every text column.
    pub(crate) fn sanitize_html(self) -> Self {
        Self {
            columns: self
                .columns
                .into_iter()
                .map(|(n, v)| (n, v.sanitize_html()))
                .collect(),
        }
    }
}

fn type_mismatch(column: &str, expected: &str) -> QueryError {
    QueryError::data_shape(format!("column '{column}' is not {expected}"))
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Map a [`Row`] into a typed struct.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> QueryResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_pairs(vec![
            ("id".to_string(), Value::Int(7)),
            ("name".to_string(), Value::Text("alice".to_string())),
            ("deleted_at".to_string(), Value::Null),
        ])
    }

    #[test]
    fn typed_access() {
        let row = sample();
        assert_eq!(row.get_int("id").unwrap(), 7);
        assert_eq!(row.get_text("name").unwrap(), "alice");
        assert_eq!(row.get_int_opt("deleted_at").unwrap(), None);
    }

    #[test]
    fn missing_column_is_data_shape_error() {
        let err = sample().get_int("nope").unwrap_err();
        assert!(matches!(err, QueryError::DataShape(_)));
    }

    #[test]
    fn wrong_type_is_data_shape_error() {
        let err = sample().get_int("name").unwrap_err();
        assert!(matches!(err, QueryError::DataShape(_)));
    }

    #[test]
    fn serializes_as_map() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "name": "alice", "deleted_at": null})
        );
    }

    #[test]
    fn from_row_struct_mapping() {
        struct User {
            id: i64,
            name: String,
        }
        impl FromRow for User {
            fn from_row(row: &Row) -> QueryResult<Self> {
                Ok(User {
                    id: row.get_int("id")?,
                    name: row.get_text("name")?.to_string(),
                })
            }
        }
        let user = User::from_row(&sample()).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "alice");
    }
}
