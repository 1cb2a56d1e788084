//! Identifier quoting and validation for each supported engine.
//!
//! All DDL and DML built by this crate quotes identifiers through these
//! helpers, so table and column names containing spaces, keywords, or the
//! quote character itself survive translation.

use crate::error::{MigrateError, Result};

/// Quote an identifier for SQL Server / SQLite bracket syntax.
///
/// `]` is escaped by doubling.
pub fn quote_bracket(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Quote an identifier for PostgreSQL.
///
/// `"` is escaped by doubling.
pub fn quote_pg(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote an identifier for MySQL.
///
/// Backtick is escaped by doubling.
pub fn quote_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Derive a bind-parameter name from a column name.
///
/// Characters outside `[A-Za-z0-9_]` become underscores so names with
/// spaces or punctuation remain valid parameter identifiers.
pub fn parameter_name(column: &str) -> String {
    column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Reject identifiers no engine can represent.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Schema(
            "Identifier must not be empty".to_string(),
        ));
    }
    if name.contains('\0') {
        return Err(MigrateError::Schema(format!(
            "Identifier contains a null byte: {:?}",
            name
        )));
    }
    if name.len() > 128 {
        return Err(MigrateError::Schema(format!(
            "Identifier exceeds 128 bytes: {}",
            name
        )));
    }
    Ok(())
}
