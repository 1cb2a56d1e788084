//! SQL Server (T-SQL) dialect.

use std::sync::Arc;

use crate::config::Engine;
use crate::core::identifier::quote_bracket;
use crate::core::schema::DbColumnInfo;
use crate::dialect::{base_type, Dialect};
use crate::expr::{ExpressionParser, TsqlParser};
use crate::typemap::{GenericType, TypeMapper};

pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn engine(&self) -> Engine {
        Engine::SqlServer
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_bracket(name)
    }

    fn type_mapper(&self) -> Arc<dyn TypeMapper> {
        Arc::new(SqlServerTypeMapper)
    }

    fn expression_parser(&self) -> Arc<dyn ExpressionParser> {
        Arc::new(TsqlParser)
    }
}

pub struct SqlServerTypeMapper;

impl TypeMapper for SqlServerTypeMapper {
    fn engine(&self) -> Engine {
        Engine::SqlServer
    }

    fn to_generic(&self, type_name: &str) -> GenericType {
        match base_type(type_name).as_str() {
            "tinyint" => GenericType::Int8,
            "smallint" => GenericType::Int16,
            "int" => GenericType::Int32,
            "bigint" => GenericType::Int64,
            "bit" => GenericType::Bool,
            "decimal" | "numeric" | "money" | "smallmoney" => GenericType::Decimal,
            "real" => GenericType::Float32,
            "float" => GenericType::Float64,
            "date" => GenericType::Date,
            "time" => GenericType::Time,
            "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" => GenericType::DateTime,
            "char" | "nchar" => GenericType::FixedString,
            "varchar" | "nvarchar" | "text" | "ntext" | "sysname" => GenericType::VarString,
            "uniqueidentifier" => GenericType::Guid,
            "binary" | "varbinary" | "image" | "timestamp" | "rowversion" => GenericType::Binary,
            "xml" => GenericType::Xml,
            // Spatial and hierarchy types are read as their textual
            // rendering, so they land as strings.
            "hierarchyid" | "geography" | "geometry" => GenericType::VarString,
            _ => GenericType::Unknown,
        }
    }

    fn from_generic(&self, generic: GenericType, info: &DbColumnInfo) -> String {
        match generic {
            GenericType::Int8 => "TINYINT".to_string(),
            GenericType::Int16 => "SMALLINT".to_string(),
            GenericType::Int32 => "INT".to_string(),
            GenericType::Int64 => "BIGINT".to_string(),
            GenericType::Bool => "BIT".to_string(),
            GenericType::VarString => match info.length {
                Some(n) if n > 0 && n <= 4000 => format!("NVARCHAR({})", n),
                _ => "NVARCHAR(MAX)".to_string(),
            },
            GenericType::FixedString => match info.length {
                Some(n) if n > 0 => format!("NCHAR({})", n),
                _ => "NCHAR(1)".to_string(),
            },
            GenericType::Decimal => match (info.precision, info.scale) {
                (Some(p), Some(s)) => format!("DECIMAL({},{})", p, s),
                (Some(p), None) => format!("DECIMAL({})", p),
                _ => "DECIMAL(18,2)".to_string(),
            },
            GenericType::Float32 => "REAL".to_string(),
            GenericType::Float64 => "FLOAT".to_string(),
            GenericType::Date => "DATE".to_string(),
            GenericType::Time => "TIME".to_string(),
            GenericType::DateTime => "DATETIME2".to_string(),
            GenericType::Guid => "UNIQUEIDENTIFIER".to_string(),
            GenericType::Binary => "VARBINARY(MAX)".to_string(),
            GenericType::Xml => "XML".to_string(),
            GenericType::Unknown => "NVARCHAR(MAX)".to_string(),
        }
    }

    fn auto_increment(&self, generic: GenericType) -> Option<String> {
        match generic {
            GenericType::Int32 => Some("INT IDENTITY(1,1)".to_string()),
            GenericType::Int64 => Some("BIGINT IDENTITY(1,1)".to_string()),
            _ => None,
        }
    }
}
