//! Migration request types and validation.
//!
//! A [`MigrationRequest`] is the input shape the engine accepts from its
//! front-end: a source/destination dialect pair from the closed [`Engine`]
//! set plus two opaque connection descriptors. The engine never constructs
//! connection strings itself; descriptors are passed through to the
//! registered connectors unchanged (for a file-backed destination the
//! descriptor is the file path).

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Supported SQL engines.
///
/// This is a closed set: every dialect module, type mapper, and expression
/// adapter is keyed by one of these variants, so adding an engine is a
/// compile-time change, never a runtime registration surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Microsoft SQL Server (T-SQL).
    SqlServer,
    /// PostgreSQL.
    Postgres,
    /// SQLite (file-backed destination).
    Sqlite,
    /// MySQL / MariaDB.
    MySql,
}

impl Engine {
    /// Stable lowercase identifier used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Engine::SqlServer => "sqlserver",
            Engine::Postgres => "postgres",
            Engine::Sqlite => "sqlite",
            Engine::MySql => "mysql",
        }
    }

    /// Whether the connection descriptor is a filesystem path.
    ///
    /// File-backed destinations get their parent directory created and any
    /// pre-existing file deleted before connecting, for a clean run.
    pub fn is_file_backed(&self) -> bool {
        matches!(self, Engine::Sqlite)
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A request to migrate one database from a source engine to a destination engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRequest {
    /// Source dialect tag.
    pub source_dialect: Engine,

    /// Destination dialect tag.
    pub destination_dialect: Engine,

    /// Opaque source connection descriptor.
    pub source_connection: String,

    /// Opaque destination connection descriptor (a file path for
    /// file-backed engines).
    pub destination_connection: String,
}

impl MigrationRequest {
    /// Validate the request.
    ///
    /// Fails on empty connection descriptors. This runs before any
    /// connection is opened, so a validation failure has zero side effects.
    pub fn validate(&self) -> Result<()> {
        if self.source_connection.trim().is_empty() {
            return Err(MigrateError::Validation(
                "Source connection descriptor must be provided".to_string(),
            ));
        }
        if self.destination_connection.trim().is_empty() {
            return Err(MigrateError::Validation(
                "Destination connection descriptor must be provided".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MigrationRequest {
        MigrationRequest {
            source_dialect: Engine::SqlServer,
            destination_dialect: Engine::Sqlite,
            source_connection: "Server=localhost;Database=shop".to_string(),
            destination_connection: "/tmp/shop.db".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_missing_destination_fails_validation() {
        let mut req = request();
        req.destination_connection = "   ".to_string();
        let err = req.validate().unwrap_err();
        assert!(matches!(err, MigrateError::Validation(_)));
        assert!(err.to_string().contains("Destination"));
    }

    #[test]
    fn test_missing_source_fails_validation() {
        let mut req = request();
        req.source_connection = String::new();
        assert!(matches!(
            req.validate(),
            Err(MigrateError::Validation(_))
        ));
    }

    #[test]
    fn test_request_json_round_trip() {
        let json = serde_json::to_string(&request()).unwrap();
        assert!(json.contains("\"sqlserver\""));
        assert!(json.contains("\"sqlite\""));
        let back: MigrationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source_dialect, Engine::SqlServer);
        assert_eq!(back.destination_dialect, Engine::Sqlite);
    }

    #[test]
    fn test_engine_file_backed() {
        assert!(Engine::Sqlite.is_file_backed());
        assert!(!Engine::Postgres.is_file_backed());
        assert!(!Engine::SqlServer.is_file_backed());
        assert!(!Engine::MySql.is_file_backed());
    }
}
