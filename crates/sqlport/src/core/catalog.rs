//! Driver catalog: explicit registration of dialects and connectors.
//!
//! The engine resolves everything it needs through the catalog at run time,
//! so embedders can swap in their own connectors (and tests can register
//! in-memory ones) without feature flags or link-time magic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Engine;
use crate::core::traits::{DataReader, DataWriter, SchemaReader, SchemaWriter};
use crate::dialect::{self, Dialect};
use crate::error::{MigrateError, Result};

/// An open source connection pair.
pub struct SourceHandle {
    pub schema: Arc<dyn SchemaReader>,
    pub data: Arc<dyn DataReader>,
}

/// An open destination connection pair.
pub struct TargetHandle {
    pub schema: Arc<dyn SchemaWriter>,
    pub data: Arc<dyn DataWriter>,
}

/// Opens connections to a source engine from an opaque descriptor.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    async fn connect(&self, descriptor: &str) -> Result<SourceHandle>;
}

/// Opens connections to a destination engine from an opaque descriptor.
#[async_trait]
pub trait TargetConnector: Send + Sync {
    async fn connect(&self, descriptor: &str) -> Result<TargetHandle>;
}

/// Registry of dialects and connectors, keyed by [`Engine`].
///
/// Dialects for all supported engines are built in; connectors are
/// registered by the embedder.
pub struct DriverCatalog {
    dialects: HashMap<Engine, Arc<dyn Dialect>>,
    source_connectors: HashMap<Engine, Arc<dyn SourceConnector>>,
    target_connectors: HashMap<Engine, Arc<dyn TargetConnector>>,
}

impl DriverCatalog {
    /// Empty catalog with no dialects. Prefer [`with_builtins`](Self::with_builtins).
    pub fn new() -> Self {
        DriverCatalog {
            dialects: HashMap::new(),
            source_connectors: HashMap::new(),
            target_connectors: HashMap::new(),
        }
    }

    /// Catalog pre-populated with the built-in dialects.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register_dialect(Arc::new(dialect::sqlserver::SqlServerDialect));
        catalog.register_dialect(Arc::new(dialect::postgres::PostgresDialect));
        catalog.register_dialect(Arc::new(dialect::sqlite::SqliteDialect));
        catalog.register_dialect(Arc::new(dialect::mysql::MySqlDialect));
        catalog
    }

    pub fn register_dialect(&mut self, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(dialect.engine(), dialect);
    }

    pub fn register_source_connector(
        &mut self,
        engine: Engine,
        connector: Arc<dyn SourceConnector>,
    ) {
        self.source_connectors.insert(engine, connector);
    }

    pub fn register_target_connector(
        &mut self,
        engine: Engine,
        connector: Arc<dyn TargetConnector>,
    ) {
        self.target_connectors.insert(engine, connector);
    }

    pub fn dialect(&self, engine: Engine) -> Option<Arc<dyn Dialect>> {
        self.dialects.get(&engine).cloned()
    }

    pub fn require_dialect(&self, engine: Engine) -> Result<Arc<dyn Dialect>> {
        self.dialect(engine).ok_or_else(|| {
            MigrateError::Validation(format!("No dialect registered for engine {}", engine))
        })
    }

    pub fn require_source_connector(&self, engine: Engine) -> Result<Arc<dyn SourceConnector>> {
        self.source_connectors.get(&engine).cloned().ok_or_else(|| {
            MigrateError::Validation(format!(
                "No source connector registered for engine {}",
                engine
            ))
        })
    }

    pub fn require_target_connector(&self, engine: Engine) -> Result<Arc<dyn TargetConnector>> {
        self.target_connectors.get(&engine).cloned().ok_or_else(|| {
            MigrateError::Validation(format!(
                "No target connector registered for engine {}",
                engine
            ))
        })
    }

    /// Engines with a registered dialect.
    pub fn engines(&self) -> Vec<Engine> {
        self.dialects.keys().copied().collect()
    }
}

impl Default for DriverCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}
