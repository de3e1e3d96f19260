//! Error types for quiver

use thiserror::Error;

/// Result type alias for quiver operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid builder state: bad operator, missing base clause, invalid
    /// identifier. Raised before any SQL reaches the driver.
    #[error("builder error: {0}")]
    Builder(String),

    /// Error surfaced by the underlying connection driver, carrying the
    /// driver's code and message plus the operation and table for context.
    #[error("driver error [{code}] during {operation} on `{table}`: {message}")]
    Driver {
        code: String,
        message: String,
        operation: String,
        table: String,
    },

    /// The result had an unexpected shape (rows where a scalar was required,
    /// a missing column, a value of the wrong type).
    #[error("unexpected result shape: {0}")]
    DataShape(String),

    /// Configuration error (unknown driver scheme, malformed URL).
    #[error("configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Create a builder-state error
    pub fn builder(message: impl Into<String>) -> Self {
        Self::Builder(message.into())
    }

    /// Create a driver error without operation/table context.
    ///
    /// The executor fills in the context via [`QueryError::with_context`].
    pub fn driver(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Driver {
            code: code.into(),
            message: message.into(),
            operation: String::new(),
            table: String::new(),
        }
    }

    /// Create a data-shape error
    pub fn data_shape(message: impl Into<String>) -> Self {
        Self::DataShape(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a builder-state error
    pub fn is_builder(&self) -> bool {
        matches!(self, Self::Builder(_))
    }

    /// Check if this is a driver error
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver { .. })
    }

    /// Attach operation and table context to a driver error.
    ///
    /// Context already present is kept; non-driver errors pass through.
    pub(crate) fn with_context(self, op: &str, tbl: &str) -> Self {
        match self {
            Self::Driver {
                code,
                message,
                operation,
                table,
            } => Self::Driver {
                code,
                message,
                operation: if operation.is_empty() {
                    op.to_string()
                } else {
                    operation
                },
                table: if table.is_empty() {
                    tbl.to_string()
                } else {
                    table
                },
            },
            other => other,
        }
    }
}
