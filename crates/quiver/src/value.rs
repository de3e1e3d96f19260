//! Tagged SQL values.
//!
//! Every value entering the builder is wrapped in [`Value`], which carries its
//! SQL type from the call site all the way to the binder. The binder therefore
//! never inspects or sniffs the payload to decide a bind type: the variant is
//! the type.

use serde::ser::{Serialize, Serializer};

/// Bind-type hint handed to the driver alongside each bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Bytes,
}

/// A SQL value carried through the builder, binder and result rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Check whether this is the SQL NULL marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The bind-type hint for this value.
    pub fn type_hint(&self) -> SqlType {
        match self {
            Value::Null => SqlType::Null,
            Value::Bool(_) => SqlType::Bool,
            Value::Int(_) => SqlType::Int,
            Value::Float(_) => SqlType::Float,
            Value::Text(_) => SqlType::Text,
            Value::Bytes(_) => SqlType::Bytes,
        }
    }

    /// Borrow the inner integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the inner float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the inner boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the inner string, if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// HTML-escape `Text` payloads; every other variant passes through.
    pub(crate) fn sanitize_html(self) -> Self {
        match self {
            Value::Text(s) => Value::Text(html_escape(&s)),
            other => other,
        }
    }
}

/// Escape the HTML-significant characters in a fetched text value.
pub(crate) fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            // Compound JSON is stored as its serialized text form.
            other => Value::Text(other.to_string()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(n) => serde_json::Value::from(n),
            Value::Float(f) => serde_json::Value::from(f),
            Value::Text(s) => serde_json::Value::String(s),
            Value::Bytes(b) => serde_json::Value::from(b),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_hints_follow_variants() {
        assert_eq!(Value::from(1i32).type_hint(), SqlType::Int);
        assert_eq!(Value::from(true).type_hint(), SqlType::Bool);
        assert_eq!(Value::from("x").type_hint(), SqlType::Text);
        assert_eq!(Value::from(1.5f64).type_hint(), SqlType::Float);
        assert_eq!(Value::Null.type_hint(), SqlType::Null);
    }

    #[test]
    fn option_maps_none_to_null() {
        let v: Value = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: Value = Some("alice").into();
        assert_eq!(v, Value::Text("alice".to_string()));
    }

    #[test]
    fn json_round_trip() {
        let v = Value::from(serde_json::json!(42));
        assert_eq!(v, Value::Int(42));
        let back: serde_json::Value = Value::Text("hi".into()).into();
        assert_eq!(back, serde_json::json!("hi"));
    }

    #[test]
    fn html_escape_covers_markup() {
        assert_eq!(
            html_escape(r#"<b a="1">&'"#),
            "&lt;b a=&quot;1&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn sanitize_only_touches_text() {
        assert_eq!(
            Value::Text("<x>".into()).sanitize_html(),
            Value::Text("&lt;x&gt;".into())
        );
        assert_eq!(Value::Int(7).sanitize_html(), Value::Int(7));
    }
}
