//! Predicate primitives: operators, connectives, sort directions, operands.

use crate::builder::QueryBuilder;
use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Comparison operator for WHERE / HAVING / ON predicates.
///
/// The set is closed: anything outside it is rejected at the call site and
/// never reaches the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Equal: column = value
    Eq,
    /// Not equal: column != value
    Ne,
    /// Greater than: column > value
    Gt,
    /// Greater than or equal: column >= value
    Gte,
    /// Less than: column < value
    Lt,
    /// Less than or equal: column <= value
    Lte,
    /// LIKE pattern match
    Like,
    /// NOT LIKE pattern match
    NotLike,
}

impl Op {
    /// Parse an operator string against the whitelist, case-insensitively.
    ///
    /// `=<` is accepted as a historical spelling of `<=`, and `<>` as an
    /// alternative to `!=`. Anything else is a builder error.
    pub fn parse(raw: &str) -> QueryResult<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "=" => Ok(Op::Eq),
            "!=" | "<>" => Ok(Op::Ne),
            ">" => Ok(Op::Gt),
            ">=" => Ok(Op::Gte),
            "<" => Ok(Op::Lt),
            "<=" | "=<" => Ok(Op::Lte),
            "like" => Ok(Op::Like),
            "not like" => Ok(Op::NotLike),
            _ => Err(QueryError::builder(format!(
                "unknown comparison operator '{raw}'"
            ))),
        }
    }

    /// The SQL spelling of this operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "like",
            Op::NotLike => "not like",
        }
    }
}

/// Boolean connective between predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner join",
            JoinKind::Left => "left join",
            JoinKind::Right => "right join",
        }
    }
}

/// Right-hand side of a comparison predicate: either a bound value or an
/// inlined sub-query.
///
/// Values always travel as `?` placeholders; sub-queries are rendered
/// parenthesized with their own bindings spliced in placeholder order.
#[derive(Debug)]
pub enum Operand {
    Value(Value),
    SubQuery(Box<QueryBuilder>),
}

impl Operand {
    /// Wrap a literal value.
    pub fn value(v: impl Into<Value>) -> Self {
        Operand::Value(v.into())
    }

    /// Wrap a sub-query builder.
    pub fn sub_query(qb: QueryBuilder) -> Self {
        Operand::SubQuery(Box::new(qb))
    }

    /// Render to a SQL fragment plus the bindings it contributes.
    pub(crate) fn render(self) -> (String, Vec<Value>) {
        match self {
            Operand::Value(v) => ("?".to_string(), vec![v]),
            Operand::SubQuery(mut qb) => {
                let (sql, bindings) = qb.render_select();
                (format!("({sql})"), bindings)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_whitelist() {
        assert_eq!(Op::parse("=").unwrap(), Op::Eq);
        assert_eq!(Op::parse("<>").unwrap(), Op::Ne);
        assert_eq!(Op::parse("=<").unwrap(), Op::Lte);
        assert_eq!(Op::parse("LIKE").unwrap(), Op::Like);
        assert_eq!(Op::parse("Not Like").unwrap(), Op::NotLike);
    }

    #[test]
    fn parse_rejects_anything_else() {
        assert!(Op::parse("DROP TABLE").is_err());
        assert!(Op::parse("in").is_err());
        assert!(Op::parse("").is_err());
        assert!(Op::parse("= 1 or 1 =").is_err());
    }

    #[test]
    fn operand_value_is_one_placeholder() {
        let (sql, bindings) = Operand::value(5i64).render();
        assert_eq!(sql, "?");
        assert_eq!(bindings, vec![Value::Int(5)]);
    }
}
