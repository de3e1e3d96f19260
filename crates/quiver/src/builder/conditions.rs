//! The condition composer: where-clause construction.
//!
//! Every method here appends one parenthesized predicate to the builder's
//! where string with an explicit `and`/`or` connective, pushing the matching
//! bind values in the same call so placeholders and bindings cannot drift.

use crate::builder::predicate::{Connective, Op, Operand};
use crate::builder::QueryBuilder;
use crate::error::{QueryError, QueryResult};
use crate::ident;
use crate::value::Value;

impl QueryBuilder {
    /// Append a predicate fragment plus its bindings.
    fn push_where(&mut self, connective: Connective, fragment: String, bindings: Vec<Value>) {
        match &mut self.where_clause {
            None => self.where_clause = Some(format!("({fragment})")),
            Some(w) => {
                w.push_str(&format!(" {} ({fragment})", connective.as_sql()));
            }
        }
        self.where_bindings.extend(bindings);
    }

    /// `or`-connected predicates need an existing clause to combine with.
    fn require_where(&self, method: &str) -> QueryResult<()> {
        if self.where_clause.is_none() {
            return Err(QueryError::builder(format!(
                "{method} called before any where clause exists"
            )));
        }
        Ok(())
    }

    fn push_comparison(
        &mut self,
        connective: Connective,
        column: &str,
        op: Op,
        operand: Operand,
    ) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        let (rhs, bindings) = operand.render();
        self.push_where(connective, format!("{column} {} {rhs}", op.as_sql()), bindings);
        Ok(self)
    }

    // ==================== Comparisons ====================

    /// Add `column = value`, `and`-combined with any existing clause.
    pub fn where_eq(&mut self, column: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push_comparison(Connective::And, column, Op::Eq, Operand::value(value))
    }

    /// Add `column = value` with an `or` connective.
    pub fn or_where_eq(&mut self, column: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.require_where("or_where_eq")?;
        self.push_comparison(Connective::Or, column, Op::Eq, Operand::value(value))
    }

    /// Add `column <op> value` with an explicit operator.
    pub fn where_op(
        &mut self,
        column: &str,
        op: Op,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.push_comparison(Connective::And, column, op, Operand::value(value))
    }

    /// Add `column <op> value` with an `or` connective.
    pub fn or_where_op(
        &mut self,
        column: &str,
        op: Op,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.require_where("or_where_op")?;
        self.push_comparison(Connective::Or, column, op, Operand::value(value))
    }

    /// Add `column <op> value`, parsing the operator against the whitelist.
    ///
    /// Unknown operators are a builder error; nothing reaches the SQL text.
    pub fn where_op_str(
        &mut self,
        column: &str,
        op: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        let op = Op::parse(op)?;
        self.where_op(column, op, value)
    }

    /// `or` variant of [`where_op_str`](Self::where_op_str).
    pub fn or_where_op_str(
        &mut self,
        column: &str,
        op: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        let op = Op::parse(op)?;
        self.or_where_op(column, op, value)
    }

    /// Compare a column against a sub-query: `column <op> (select …)`.
    ///
    /// The sub-query is inlined parenthesized; its bindings splice into this
    /// builder's binding list at the placeholder position.
    pub fn where_sub(&mut self, column: &str, op: Op, sub: QueryBuilder) -> QueryResult<&mut Self> {
        self.push_comparison(Connective::And, column, op, Operand::sub_query(sub))
    }

    /// `or` variant of [`where_sub`](Self::where_sub).
    pub fn or_where_sub(
        &mut self,
        column: &str,
        op: Op,
        sub: QueryBuilder,
    ) -> QueryResult<&mut Self> {
        self.require_where("or_where_sub")?;
        self.push_comparison(Connective::Or, column, op, Operand::sub_query(sub))
    }

    // ==================== NULL checks ====================

    /// Add `column is null`.
    pub fn where_null(&mut self, column: &str) -> QueryResult<&mut Self> {
        self.push_null_check(Connective::And, column, true)
    }

    /// Add `column is not null`.
    pub fn where_not_null(&mut self, column: &str) -> QueryResult<&mut Self> {
        self.push_null_check(Connective::And, column, false)
    }

    /// Add `column is null` with an `or` connective.
    pub fn or_where_null(&mut self, column: &str) -> QueryResult<&mut Self> {
        self.require_where("or_where_null")?;
        self.push_null_check(Connective::Or, column, true)
    }

    /// Add `column is not null` with an `or` connective.
    pub fn or_where_not_null(&mut self, column: &str) -> QueryResult<&mut Self> {
        self.require_where("or_where_not_null")?;
        self.push_null_check(Connective::Or, column, false)
    }

    fn push_null_check(
        &mut self,
        connective: Connective,
        column: &str,
        is_null: bool,
    ) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        let fragment = if is_null {
            format!("{column} is null")
        } else {
            format!("{column} is not null")
        };
        self.push_where(connective, fragment, Vec::new());
        Ok(self)
    }

    // ==================== BETWEEN ====================

    /// Add `column between lo and hi`, both bounds parameter-bound.
    pub fn where_between(
        &mut self,
        column: &str,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.push_between(Connective::And, column, lo.into(), hi.into(), false)
    }

    /// Add `column not between lo and hi`.
    pub fn where_not_between(
        &mut self,
        column: &str,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.push_between(Connective::And, column, lo.into(), hi.into(), true)
    }

    /// Add `column between lo and hi` with an `or` connective.
    pub fn or_where_between(
        &mut self,
        column: &str,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.require_where("or_where_between")?;
        self.push_between(Connective::Or, column, lo.into(), hi.into(), false)
    }

    fn push_between(
        &mut self,
        connective: Connective,
        column: &str,
        lo: Value,
        hi: Value,
        negated: bool,
    ) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        let keyword = if negated { "not between" } else { "between" };
        self.push_where(
            connective,
            format!("{column} {keyword} ? and ?"),
            vec![lo, hi],
        );
        Ok(self)
    }

    // ==================== IN lists ====================

    /// Add `column in (…)` with one placeholder per element.
    ///
    /// An empty list renders the always-false `1 = 0`.
    pub fn where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: Vec<V>,
    ) -> QueryResult<&mut Self> {
        self.push_in_list(Connective::And, column, values, false)
    }

    /// Add `column not in (…)`. An empty list renders the always-true `1 = 1`.
    pub fn where_not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: Vec<V>,
    ) -> QueryResult<&mut Self> {
        self.push_in_list(Connective::And, column, values, true)
    }

    /// Add `column in (…)` with an `or` connective.
    pub fn or_where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: Vec<V>,
    ) -> QueryResult<&mut Self> {
        self.require_where("or_where_in")?;
        self.push_in_list(Connective::Or, column, values, false)
    }

    fn push_in_list<V: Into<Value>>(
        &mut self,
        connective: Connective,
        column: &str,
        values: Vec<V>,
        negated: bool,
    ) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        if values.is_empty() {
            let fragment = if negated { "1 = 1" } else { "1 = 0" };
            self.push_where(connective, fragment.to_string(), Vec::new());
            return Ok(self);
        }
        let bindings: Vec<Value> = values.into_iter().map(Into::into).collect();
        let placeholders = vec!["?"; bindings.len()].join(", ");
        let keyword = if negated { "not in" } else { "in" };
        self.push_where(
            connective,
            format!("{column} {keyword} ({placeholders})"),
            bindings,
        );
        Ok(self)
    }

    /// Add `column in (select …)`, inlining the sub-query.
    pub fn where_in_sub(&mut self, column: &str, sub: QueryBuilder) -> QueryResult<&mut Self> {
        self.push_in_sub(Connective::And, column, sub, false)
    }

    /// Add `column not in (select …)`.
    pub fn where_not_in_sub(&mut self, column: &str, sub: QueryBuilder) -> QueryResult<&mut Self> {
        self.push_in_sub(Connective::And, column, sub, true)
    }

    fn push_in_sub(
        &mut self,
        connective: Connective,
        column: &str,
        mut sub: QueryBuilder,
        negated: bool,
    ) -> QueryResult<&mut Self> {
        ident::validate(column)?;
        let (sql, bindings) = sub.render_select();
        let keyword = if negated { "not in" } else { "in" };
        self.push_where(connective, format!("{column} {keyword} ({sql})"), bindings);
        Ok(self)
    }
}
