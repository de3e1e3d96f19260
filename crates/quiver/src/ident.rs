//! SQL identifier validation.
//!
//! Table and column names reaching predicate-bearing positions are checked
//! here so an identifier argument can never smuggle SQL text. Unquoted dotted
//! notation is supported (`schema.table.column`); each part must match
//! `[A-Za-z_][A-Za-z0-9_$]*`.

use crate::error::{QueryError, QueryResult};

/// Validate a table or column identifier.
pub fn validate(name: &str) -> QueryResult<()> {
    if name.is_empty() {
        return Err(QueryError::builder("identifier cannot be empty"));
    }
    for part in name.split('.') {
        validate_part(part)?;
    }
    Ok(())
}

/// Validate a column position that may also be the `*` wildcard.
pub fn validate_column(name: &str) -> QueryResult<()> {
    if name == "*" {
        return Ok(());
    }
    validate(name)
}

fn validate_part(part: &str) -> QueryResult<()> {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(QueryError::builder(format!(
                "invalid identifier start character: '{c}'"
            )));
        }
        None => return Err(QueryError::builder("empty identifier segment")),
    }
    for c in chars {
        if c != '_' && c != '$' && !c.is_ascii_alphanumeric() {
            return Err(QueryError::builder(format!(
                "invalid character in identifier: '{c}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        assert!(validate("users").is_ok());
    }

    #[test]
    fn ident_dotted() {
        assert!(validate("public.users.id").is_ok());
    }

    #[test]
    fn ident_with_dollar() {
        assert!(validate("my_var$1").is_ok());
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(validate("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(validate("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(validate("my table").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(validate("schema..table").is_err());
    }

    #[test]
    fn ident_rejects_injection() {
        assert!(validate("id; drop table users").is_err());
        assert!(validate("id = 1 or 1").is_err());
    }

    #[test]
    fn column_allows_star() {
        assert!(validate_column("*").is_ok());
        assert!(validate("*").is_err());
    }
}
