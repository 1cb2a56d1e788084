//! Generic-type pivot for cross-dialect column type translation.
//!
//! Every source type maps into a [`GenericType`], and every destination
//! renders a [`GenericType`] plus the source column's facets into DDL text.
//! Adding an engine means writing one mapper, not one translation per
//! engine pair.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Engine;
use crate::core::catalog::DriverCatalog;
use crate::core::schema::{Column, DbColumnInfo};
use crate::dialect;
use crate::error::{MigrateError, Result};

/// The engine-neutral pivot type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericType {
    Int8,
    Int16,
    Int32,
    Int64,
    Bool,
    /// Variable-length string, bounded or unbounded.
    VarString,
    /// Fixed-length string.
    FixedString,
    Decimal,
    Float32,
    Float64,
    Date,
    Time,
    DateTime,
    Guid,
    Binary,
    Xml,
    /// No generic equivalent. Translation yields no DDL and a warning.
    Unknown,
}

/// Per-engine half of the pivot.
pub trait TypeMapper: Send + Sync {
    fn engine(&self) -> Engine;

    /// Source type name (facets included or not) to generic type.
    /// Unrecognized names map to [`GenericType::Unknown`].
    fn to_generic(&self, type_name: &str) -> GenericType;

    /// Generic type plus source facets to destination DDL type text.
    fn from_generic(&self, generic: GenericType, info: &DbColumnInfo) -> String;

    /// Destination type text for an auto-incrementing key of this generic
    /// type, when the engine spells identity as a type (e.g. `BIGSERIAL`).
    fn auto_increment(&self, _generic: GenericType) -> Option<String> {
        None
    }
}

/// Result of translating one column type.
#[derive(Debug, Clone)]
pub struct TypeTranslation {
    /// Destination DDL type text, or `None` when the source type has no
    /// generic equivalent.
    pub ddl: Option<String>,
    /// Human-readable warning when translation degraded.
    pub warning: Option<String>,
}

/// Pivot service over all registered type mappers.
pub struct TypeService {
    mappers: HashMap<Engine, Arc<dyn TypeMapper>>,
}

impl TypeService {
    /// Service over the built-in engine mappers.
    pub fn with_builtins() -> Self {
        let mut mappers: HashMap<Engine, Arc<dyn TypeMapper>> = HashMap::new();
        mappers.insert(Engine::SqlServer, Arc::new(dialect::sqlserver::SqlServerTypeMapper));
        mappers.insert(Engine::Postgres, Arc::new(dialect::postgres::PostgresTypeMapper));
        mappers.insert(Engine::Sqlite, Arc::new(dialect::sqlite::SqliteTypeMapper));
        mappers.insert(Engine::MySql, Arc::new(dialect::mysql::MySqlTypeMapper));
        TypeService { mappers }
    }

    /// Service built from whatever dialects a catalog carries.
    pub fn from_catalog(catalog: &DriverCatalog) -> Self {
        let mut mappers = HashMap::new();
        for engine in catalog.engines() {
            if let Some(dialect) = catalog.dialect(engine) {
                mappers.insert(engine, dialect.type_mapper());
            }
        }
        TypeService { mappers }
    }

    fn mapper(&self, engine: Engine) -> Result<&Arc<dyn TypeMapper>> {
        self.mappers.get(&engine).ok_or_else(|| {
            MigrateError::Validation(format!("No type mapper registered for engine {}", engine))
        })
    }

    /// The generic type of a source column type name.
    pub fn source_generic(&self, type_name: &str, source: Engine) -> Result<GenericType> {
        Ok(self.mapper(source)?.to_generic(type_name))
    }

    /// Translate one column's type from source to destination DDL text.
    ///
    /// An unmapped source type never fails the migration: it yields
    /// `ddl: None` plus a warning, and the caller picks a fallback.
    pub fn translate(&self, column: &Column, source: Engine, dest: Engine) -> Result<TypeTranslation> {
        let generic = self.mapper(source)?.to_generic(&column.data_type);
        if generic == GenericType::Unknown {
            return Ok(TypeTranslation {
                ddl: None,
                warning: Some(format!(
                    "No generic mapping for {} type {} (column {})",
                    source, column.data_type, column.name
                )),
            });
        }
        let ddl = self.mapper(dest)?.from_generic(generic, &column.column_info());
        Ok(TypeTranslation {
            ddl: Some(ddl),
            warning: None,
        })
    }

    /// Destination identity/auto-increment type for a generic type, if the
    /// destination spells identity as a type.
    pub fn auto_increment(&self, generic: GenericType, dest: Engine) -> Result<Option<String>> {
        Ok(self.mapper(dest)?.auto_increment(generic))
    }
}
