//! # quiver
//!
//! A fluent SQL query builder and executor for MySQL and SQLite drivers.
//!
//! ## Features
//!
//! - **Fluent accumulation**: a [`QueryBuilder`] gathers select, join, where,
//!   group, having, order and limit clauses, then renders once
//! - **Placeholders only**: every value travels as a `?` bind, pushed in the
//!   same call as its SQL fragment so order can never drift
//! - **Explicit operators**: comparison operators are a closed enum; string
//!   operators are parsed against a whitelist and rejected otherwise
//! - **Type-safe mapping**: Row → Struct via the [`FromRow`] trait
//! - **Driver boundary**: the [`Connection`] and [`PreparedStatement`] traits
//!   are the only surface a backend has to implement
//! - **Pagination**: offset pagination with clamped, 1-based page metadata
//!
//! ## Building a query
//!
//! ```ignore
//! use quiver::{Direction, QueryBuilder};
//!
//! let mut q = QueryBuilder::table("users")?;
//! q.select(&["id", "name"])
//!     .where_eq("status", "active")?
//!     .order_by("created_at", Direction::Desc)?
//!     .take(20);
//! let rows = q.get(&conn).await?;
//! ```
//!
//! ## Mutations
//!
//! ```ignore
//! let mut q = QueryBuilder::table("users")?;
//! q.where_eq("id", 7)?;
//! q.update(&conn, &[("status", "inactive".into())]).await?;
//! ```

pub mod binder;
pub mod builder;
pub mod config;
pub mod connection;
pub mod error;
pub mod ident;
pub mod pagination;
pub mod row;
pub mod value;

mod executor;
#[cfg(test)]
mod test_support;

pub use builder::{Connective, Direction, JoinKind, Op, Operand, QueryBuilder};
pub use config::{BuilderConfig, ClauseOrder, ConnectionConfig, SanitizeMode};
pub use connection::{Connection, DriverKind, PreparedStatement};
pub use error::{QueryError, QueryResult};
pub use executor::{Agg, Aggregate};
pub use pagination::Pagination;
pub use row::{FromRow, Row};
pub use value::{SqlType, Value};
