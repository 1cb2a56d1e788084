//! MySQL / MariaDB dialect.

use std::sync::Arc;

use crate::config::Engine;
use crate::core::identifier::quote_mysql;
use crate::core::schema::DbColumnInfo;
use crate::dialect::{base_type, Dialect};
use crate::expr::{ExpressionGenerator, ExpressionParser, MysqlGenerator, RawParser};
use crate::typemap::{GenericType, TypeMapper};

pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_mysql(name)
    }

    fn type_mapper(&self) -> Arc<dyn TypeMapper> {
        Arc::new(MySqlTypeMapper)
    }

    fn expression_parser(&self) -> Arc<dyn ExpressionParser> {
        Arc::new(RawParser)
    }

    fn expression_generator(&self) -> Option<Arc<dyn ExpressionGenerator>> {
        Some(Arc::new(MysqlGenerator))
    }
}

pub struct MySqlTypeMapper;

impl TypeMapper for MySqlTypeMapper {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    fn to_generic(&self, type_name: &str) -> GenericType {
        // tinyint(1) is the conventional boolean spelling.
        if type_name.trim().to_lowercase().starts_with("tinyint(1)") {
            return GenericType::Bool;
        }
        match base_type(type_name).as_str() {
            "tinyint" => GenericType::Int8,
            "smallint" | "year" => GenericType::Int16,
            "mediumint" | "int" | "integer" => GenericType::Int32,
            "bigint" => GenericType::Int64,
            "bit" | "boolean" | "bool" => GenericType::Bool,
            "decimal" | "numeric" => GenericType::Decimal,
            "float" => GenericType::Float32,
            "double" | "double precision" | "real" => GenericType::Float64,
            "date" => GenericType::Date,
            "time" => GenericType::Time,
            "datetime" | "timestamp" => GenericType::DateTime,
            "char" => GenericType::FixedString,
            "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set"
            | "json" => GenericType::VarString,
            "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
                GenericType::Binary
            }
            _ => GenericType::Unknown,
        }
    }

    fn from_generic(&self, generic: GenericType, info: &DbColumnInfo) -> String {
        match generic {
            GenericType::Int8 => "TINYINT".to_string(),
            GenericType::Int16 => "SMALLINT".to_string(),
            GenericType::Int32 => "INT".to_string(),
            GenericType::Int64 => "BIGINT".to_string(),
            GenericType::Bool => "TINYINT(1)".to_string(),
            GenericType::VarString => match info.length {
                Some(n) if n > 0 && n <= 65535 => format!("VARCHAR({})", n),
                _ => "LONGTEXT".to_string(),
            },
            GenericType::FixedString => match info.length {
                Some(n) if n > 0 => format!("CHAR({})", n),
                _ => "CHAR(1)".to_string(),
            },
            GenericType::Decimal => match (info.precision, info.scale) {
                (Some(p), Some(s)) => format!("DECIMAL({},{})", p, s),
                (Some(p), None) => format!("DECIMAL({})", p),
                _ => "DECIMAL(18,2)".to_string(),
            },
            GenericType::Float32 => "FLOAT".to_string(),
            GenericType::Float64 => "DOUBLE".to_string(),
            GenericType::Date => "DATE".to_string(),
            GenericType::Time => "TIME".to_string(),
            GenericType::DateTime => "DATETIME".to_string(),
            GenericType::Guid => "CHAR(36)".to_string(),
            GenericType::Binary => "LONGBLOB".to_string(),
            GenericType::Xml | GenericType::Unknown => "LONGTEXT".to_string(),
        }
    }

    fn auto_increment(&self, generic: GenericType) -> Option<String> {
        match generic {
            GenericType::Int32 => Some("INT AUTO_INCREMENT".to_string()),
            GenericType::Int64 => Some("BIGINT AUTO_INCREMENT".to_string()),
            _ => None,
        }
    }
}
