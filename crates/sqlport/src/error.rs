//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
///
/// The taxonomy distinguishes fatal conditions (validation, connection,
/// data transfer) from conditions that are downgraded to warnings by the
/// caller (unmapped column types, unappliable secondary constraints).
/// Warning-grade conditions never appear here; they flow through the
/// progress sink instead.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Malformed migration request. Fatal and side-effect-free.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Could not open the source or destination connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The foreign-key graph contains a cycle. Names a table on the cycle.
    #[error("Cyclic foreign-key dependency involving table {table}")]
    CyclicDependency { table: String },

    /// A universal function the destination generator cannot render.
    ///
    /// Fatal for the object being generated: silently emitting nothing
    /// would produce broken or semantically wrong destination SQL.
    #[error("Unsupported universal function {function} for dialect {dialect}")]
    UnsupportedFunction { function: String, dialect: String },

    /// Data transfer failed for a specific table.
    #[error("Transfer failed for table {table}: {message}")]
    Transfer { table: String, message: String },

    /// Schema read/write failed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// IO error (file-backed destination handling).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (request parsing).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Transfer error wrapping a table name.
    pub fn transfer(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Transfer {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an UnsupportedFunction error.
    pub fn unsupported_function(function: impl Into<String>, dialect: impl Into<String>) -> Self {
        MigrateError::UnsupportedFunction {
            function: function.into(),
            dialect: dialect.into(),
        }
    }

    /// Format the error with full details including the source chain.
    ///
    /// Used for the progress sink's terminal failure detail.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
