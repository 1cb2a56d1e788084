//! PostgreSQL dialect.

use std::sync::Arc;

use crate::config::Engine;
use crate::core::identifier::quote_pg;
use crate::core::schema::DbColumnInfo;
use crate::dialect::{base_type, Dialect};
use crate::expr::{ExpressionGenerator, ExpressionParser, PostgresGenerator, PostgresParser};
use crate::typemap::{GenericType, TypeMapper};

pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_pg(name)
    }

    fn type_mapper(&self) -> Arc<dyn TypeMapper> {
        Arc::new(PostgresTypeMapper)
    }

    fn expression_parser(&self) -> Arc<dyn ExpressionParser> {
        Arc::new(PostgresParser)
    }

    fn expression_generator(&self) -> Option<Arc<dyn ExpressionGenerator>> {
        Some(Arc::new(PostgresGenerator))
    }
}

pub struct PostgresTypeMapper;

impl TypeMapper for PostgresTypeMapper {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    fn to_generic(&self, type_name: &str) -> GenericType {
        match base_type(type_name).as_str() {
            "smallint" | "int2" | "smallserial" => GenericType::Int16,
            "integer" | "int" | "int4" | "serial" => GenericType::Int32,
            "bigint" | "int8" | "bigserial" => GenericType::Int64,
            "boolean" | "bool" => GenericType::Bool,
            "numeric" | "decimal" | "money" => GenericType::Decimal,
            "real" | "float4" => GenericType::Float32,
            "double precision" | "float8" => GenericType::Float64,
            "date" => GenericType::Date,
            "time" | "timetz" | "time without time zone" | "time with time zone" => {
                GenericType::Time
            }
            "timestamp" | "timestamptz" | "timestamp without time zone"
            | "timestamp with time zone" => GenericType::DateTime,
            "character varying" | "varchar" | "text" | "citext" | "name" => GenericType::VarString,
            "character" | "char" | "bpchar" => GenericType::FixedString,
            "uuid" => GenericType::Guid,
            "bytea" => GenericType::Binary,
            "xml" => GenericType::Xml,
            _ => GenericType::Unknown,
        }
    }

    fn from_generic(&self, generic: GenericType, info: &DbColumnInfo) -> String {
        match generic {
            // No single-byte integer; widen.
            GenericType::Int8 | GenericType::Int16 => "SMALLINT".to_string(),
            GenericType::Int32 => "INTEGER".to_string(),
            GenericType::Int64 => "BIGINT".to_string(),
            GenericType::Bool => "BOOLEAN".to_string(),
            GenericType::VarString => match info.length {
                Some(n) if n > 0 => format!("VARCHAR({})", n),
                _ => "TEXT".to_string(),
            },
            GenericType::FixedString => match info.length {
                Some(n) if n > 0 => format!("CHAR({})", n),
                _ => "CHAR(1)".to_string(),
            },
            GenericType::Decimal => match (info.precision, info.scale) {
                (Some(p), Some(s)) => format!("NUMERIC({},{})", p, s),
                (Some(p), None) => format!("NUMERIC({})", p),
                _ => "NUMERIC".to_string(),
            },
            GenericType::Float32 => "REAL".to_string(),
            GenericType::Float64 => "DOUBLE PRECISION".to_string(),
            GenericType::Date => "DATE".to_string(),
            GenericType::Time => "TIME".to_string(),
            GenericType::DateTime => "TIMESTAMP WITHOUT TIME ZONE".to_string(),
            GenericType::Guid => "UUID".to_string(),
            GenericType::Binary => "BYTEA".to_string(),
            GenericType::Xml => "XML".to_string(),
            GenericType::Unknown => "TEXT".to_string(),
        }
    }

    fn auto_increment(&self, generic: GenericType) -> Option<String> {
        match generic {
            GenericType::Int16 => Some("SMALLSERIAL".to_string()),
            GenericType::Int32 => Some("SERIAL".to_string()),
            GenericType::Int64 => Some("BIGSERIAL".to_string()),
            _ => None,
        }
    }
}
