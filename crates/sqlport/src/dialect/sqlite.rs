//! SQLite dialect.
//!
//! SQLite resolves column types by affinity keywords rather than a fixed
//! catalog, so `to_generic` falls back to the affinity rules instead of
//! returning `Unknown`.

use std::sync::Arc;

use crate::config::Engine;
use crate::core::identifier::quote_bracket;
use crate::core::schema::DbColumnInfo;
use crate::dialect::{base_type, Dialect};
use crate::expr::{ExpressionGenerator, ExpressionParser, RawParser, SqliteGenerator};
use crate::typemap::{GenericType, TypeMapper};

pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn engine(&self) -> Engine {
        Engine::Sqlite
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_bracket(name)
    }

    fn type_mapper(&self) -> Arc<dyn TypeMapper> {
        Arc::new(SqliteTypeMapper)
    }

    fn expression_parser(&self) -> Arc<dyn ExpressionParser> {
        Arc::new(RawParser)
    }

    fn expression_generator(&self) -> Option<Arc<dyn ExpressionGenerator>> {
        Some(Arc::new(SqliteGenerator))
    }
}

pub struct SqliteTypeMapper;

impl TypeMapper for SqliteTypeMapper {
    fn engine(&self) -> Engine {
        Engine::Sqlite
    }

    fn to_generic(&self, type_name: &str) -> GenericType {
        let base = base_type(type_name);
        match base.as_str() {
            "integer" | "int" => return GenericType::Int64,
            "text" => return GenericType::VarString,
            "real" => return GenericType::Float64,
            "blob" => return GenericType::Binary,
            "numeric" => return GenericType::Decimal,
            "boolean" | "bool" => return GenericType::Bool,
            "date" => return GenericType::Date,
            "datetime" | "timestamp" => return GenericType::DateTime,
            _ => {}
        }
        // Affinity keyword rules.
        if base.contains("int") {
            GenericType::Int64
        } else if base.contains("char") || base.contains("clob") || base.contains("text") {
            GenericType::VarString
        } else if base.contains("blob") {
            GenericType::Binary
        } else if base.contains("real") || base.contains("floa") || base.contains("doub") {
            GenericType::Float64
        } else {
            GenericType::Decimal
        }
    }

    fn from_generic(&self, generic: GenericType, _info: &DbColumnInfo) -> String {
        match generic {
            GenericType::Int8
            | GenericType::Int16
            | GenericType::Int32
            | GenericType::Int64
            | GenericType::Bool => "INTEGER".to_string(),
            GenericType::VarString
            | GenericType::FixedString
            | GenericType::Date
            | GenericType::Time
            | GenericType::DateTime
            | GenericType::Guid
            | GenericType::Xml
            | GenericType::Unknown => "TEXT".to_string(),
            GenericType::Decimal => "NUMERIC".to_string(),
            GenericType::Float32 | GenericType::Float64 => "REAL".to_string(),
            GenericType::Binary => "BLOB".to_string(),
        }
    }
}
