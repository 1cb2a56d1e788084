//! Destination-dialect expression generators.
//!
//! Generation is fallible: a universal function the destination cannot
//! render is a hard error for the object being generated, never a silent
//! omission.

use crate::core::identifier::{quote_bracket, quote_mysql, quote_pg};
use crate::error::{MigrateError, Result};
use crate::expr::{ExpressionNode, LiteralValue, UniversalFunction};

/// Renders the shared AST as one destination dialect's SQL fragment.
pub trait ExpressionGenerator: Send + Sync {
    fn dialect_name(&self) -> &'static str;

    fn generate(&self, node: &ExpressionNode) -> Result<String>;
}

fn quote_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Generator for PostgreSQL DDL fragments.
pub struct PostgresGenerator;

impl ExpressionGenerator for PostgresGenerator {
    fn dialect_name(&self) -> &'static str {
        "postgres"
    }

    fn generate(&self, node: &ExpressionNode) -> Result<String> {
        match node {
            ExpressionNode::Literal(literal) => Ok(match literal {
                LiteralValue::Null => "NULL".to_string(),
                LiteralValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
                LiteralValue::Number(n) => n.to_string(),
                LiteralValue::String(s) => quote_string(s),
                LiteralValue::Raw(raw) => raw.clone(),
            }),
            ExpressionNode::Identifier { name } => Ok(quote_pg(name)),
            ExpressionNode::Operator { symbol, left, right } => {
                let l = self.generate(left)?;
                let r = self.generate(right)?;
                // Source LIKE is usually collation-case-insensitive.
                let symbol = if symbol == "LIKE" { "ILIKE" } else { symbol.as_str() };
                Ok(format!("({} {} {})", l, symbol, r))
            }
            ExpressionNode::FunctionCall { function, args } => match function {
                UniversalFunction::CurrentTimestamp => Ok("NOW()".to_string()),
                UniversalFunction::GenerateUuid => Ok("gen_random_uuid()".to_string()),
                UniversalFunction::Upper => {
                    let arg = args
                        .first()
                        .ok_or_else(|| missing_arg(function, self.dialect_name()))?;
                    Ok(format!("UPPER({})", self.generate(arg)?))
                }
                UniversalFunction::DateAdd => Err(MigrateError::unsupported_function(
                    function.name(),
                    self.dialect_name(),
                )),
            },
        }
    }
}

/// Generator for SQLite DDL fragments.
pub struct SqliteGenerator;

impl SqliteGenerator {
    /// SQLite date modifier unit for a source date part.
    fn date_modifier_unit(part: &str) -> Option<&'static str> {
        match part {
            "year" | "yy" | "yyyy" => Some("years"),
            "month" | "mm" | "m" => Some("months"),
            "day" | "dd" | "d" => Some("days"),
            "hour" | "hh" => Some("hours"),
            "minute" | "mi" | "n" => Some("minutes"),
            "second" | "ss" | "s" => Some("seconds"),
            _ => None,
        }
    }
}

impl ExpressionGenerator for SqliteGenerator {
    fn dialect_name(&self) -> &'static str {
        "sqlite"
    }

    fn generate(&self, node: &ExpressionNode) -> Result<String> {
        match node {
            ExpressionNode::Literal(literal) => Ok(match literal {
                LiteralValue::Null => "NULL".to_string(),
                LiteralValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
                LiteralValue::Number(n) => n.to_string(),
                LiteralValue::String(s) => quote_string(s),
                LiteralValue::Raw(raw) => raw.clone(),
            }),
            ExpressionNode::Identifier { name } => Ok(quote_bracket(name)),
            ExpressionNode::Operator { symbol, left, right } => {
                let l = self.generate(left)?;
                let r = self.generate(right)?;
                match symbol.as_str() {
                    // Case-insensitive comparison matches the common
                    // source collation behavior.
                    "LIKE" => Ok(format!("({} LIKE {} COLLATE NOCASE)", l, r)),
                    // NULL-safe membership: SQLite evaluates checks on
                    // NULL as unknown, which would reject inserted rows
                    // during bulk load of nullable columns.
                    "IN" => Ok(format!("({} IS NULL OR {} IN {})", l, l, r)),
                    _ => Ok(format!("({} {} {})", l, symbol, r)),
                }
            }
            ExpressionNode::FunctionCall { function, args } => match function {
                UniversalFunction::CurrentTimestamp => Ok("CURRENT_TIMESTAMP".to_string()),
                UniversalFunction::GenerateUuid => {
                    Ok("(lower(hex(randomblob(16))))".to_string())
                }
                UniversalFunction::Upper => {
                    let arg = args
                        .first()
                        .ok_or_else(|| missing_arg(function, self.dialect_name()))?;
                    Ok(format!("UPPER({})", self.generate(arg)?))
                }
                UniversalFunction::DateAdd => {
                    let (part, amount, date) = match args.as_slice() {
                        [part, amount, date] => (part, amount, date),
                        _ => return Err(missing_arg(function, self.dialect_name())),
                    };
                    let unit = match part {
                        ExpressionNode::Literal(LiteralValue::String(p)) => {
                            Self::date_modifier_unit(p)
                        }
                        _ => None,
                    }
                    .ok_or_else(|| {
                        MigrateError::unsupported_function(function.name(), self.dialect_name())
                    })?;
                    let n = match amount {
                        ExpressionNode::Literal(LiteralValue::Number(n)) => n,
                        _ => {
                            return Err(MigrateError::unsupported_function(
                                function.name(),
                                self.dialect_name(),
                            ))
                        }
                    };
                    let sign = if n.is_sign_negative() { "" } else { "+" };
                    Ok(format!(
                        "date({}, '{}{} {}')",
                        self.generate(date)?,
                        sign,
                        n,
                        unit
                    ))
                }
            },
        }
    }
}

/// Generator for MySQL DDL fragments.
pub struct MysqlGenerator;

impl MysqlGenerator {
    /// MySQL INTERVAL unit for a source date part.
    fn interval_unit(part: &str) -> Option<&'static str> {
        match part {
            "year" | "yy" | "yyyy" => Some("YEAR"),
            "month" | "mm" | "m" => Some("MONTH"),
            "day" | "dd" | "d" => Some("DAY"),
            "hour" | "hh" => Some("HOUR"),
            "minute" | "mi" | "n" => Some("MINUTE"),
            "second" | "ss" | "s" => Some("SECOND"),
            _ => None,
        }
    }
}

impl ExpressionGenerator for MysqlGenerator {
    fn dialect_name(&self) -> &'static str {
        "mysql"
    }

    fn generate(&self, node: &ExpressionNode) -> Result<String> {
        match node {
            ExpressionNode::Literal(literal) => Ok(match literal {
                LiteralValue::Null => "NULL".to_string(),
                // Booleans are stored as tinyint(1).
                LiteralValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
                LiteralValue::Number(n) => n.to_string(),
                LiteralValue::String(s) => quote_string(s),
                LiteralValue::Raw(raw) => raw.clone(),
            }),
            ExpressionNode::Identifier { name } => Ok(quote_mysql(name)),
            ExpressionNode::Operator { symbol, left, right } => {
                let l = self.generate(left)?;
                let r = self.generate(right)?;
                // LIKE is already case-insensitive under the default
                // collations.
                Ok(format!("({} {} {})", l, symbol, r))
            }
            ExpressionNode::FunctionCall { function, args } => match function {
                UniversalFunction::CurrentTimestamp => Ok("NOW()".to_string()),
                UniversalFunction::GenerateUuid => Ok("uuid()".to_string()),
                UniversalFunction::Upper => {
                    let arg = args
                        .first()
                        .ok_or_else(|| missing_arg(function, self.dialect_name()))?;
                    Ok(format!("UPPER({})", self.generate(arg)?))
                }
                UniversalFunction::DateAdd => {
                    let (part, amount, date) = match args.as_slice() {
                        [part, amount, date] => (part, amount, date),
                        _ => return Err(missing_arg(function, self.dialect_name())),
                    };
                    let unit = match part {
                        ExpressionNode::Literal(LiteralValue::String(p)) => {
                            Self::interval_unit(p)
                        }
                        _ => None,
                    }
                    .ok_or_else(|| {
                        MigrateError::unsupported_function(function.name(), self.dialect_name())
                    })?;
                    Ok(format!(
                        "DATE_ADD({}, INTERVAL {} {})",
                        self.generate(date)?,
                        self.generate(amount)?,
                        unit
                    ))
                }
            },
        }
    }
}

fn missing_arg(function: &UniversalFunction, dialect: &str) -> MigrateError {
    MigrateError::unsupported_function(function.name(), dialect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::{ExpressionParser, TsqlParser};

    fn tsql(text: &str) -> ExpressionNode {
        TsqlParser.parse(text)
    }

    #[test]
    fn test_pg_renders_comparison_with_quoted_identifier() {
        let sql = PostgresGenerator.generate(&tsql("([Qty]>(0))")).unwrap();
        assert_eq!(sql, "(\"Qty\" > 0)");
    }

    #[test]
    fn test_pg_current_timestamp_and_uuid() {
        assert_eq!(
            PostgresGenerator.generate(&tsql("(getdate())")).unwrap(),
            "NOW()"
        );
        assert_eq!(
            PostgresGenerator.generate(&tsql("(newid())")).unwrap(),
            "gen_random_uuid()"
        );
    }

    #[test]
    fn test_pg_string_escaping() {
        let sql = PostgresGenerator.generate(&tsql("(N'O''Brien')")).unwrap();
        assert_eq!(sql, "'O''Brien'");
    }

    #[test]
    fn test_pg_like_becomes_ilike() {
        let sql = PostgresGenerator
            .generate(&tsql("([Code] LIKE 'AB%')"))
            .unwrap();
        assert_eq!(sql, "(\"Code\" ILIKE 'AB%')");
    }

    #[test]
    fn test_pg_dateadd_is_unsupported() {
        let err = PostgresGenerator
            .generate(&tsql("(dateadd(day,(30),getdate()))"))
            .unwrap_err();
        assert!(err.to_string().contains("DATE_ADD"));
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn test_sqlite_dateadd_becomes_date_modifier() {
        let sql = SqliteGenerator
            .generate(&tsql("(dateadd(day,(30),getdate()))"))
            .unwrap();
        assert_eq!(sql, "date(CURRENT_TIMESTAMP, '+30 days')");
    }

    #[test]
    fn test_sqlite_like_is_case_insensitive() {
        let sql = SqliteGenerator
            .generate(&tsql("([Code] LIKE 'AB%')"))
            .unwrap();
        assert_eq!(sql, "([Code] LIKE 'AB%' COLLATE NOCASE)");
    }

    #[test]
    fn test_sqlite_in_is_null_safe() {
        let sql = SqliteGenerator
            .generate(&tsql("([Status] IN ('A','B'))"))
            .unwrap();
        assert_eq!(sql, "([Status] IS NULL OR [Status] IN ('A','B'))");
    }

    #[test]
    fn test_sqlite_bool_is_numeric() {
        assert_eq!(
            SqliteGenerator
                .generate(&tsql("(CONVERT([bit],(1)))"))
                .unwrap(),
            "1"
        );
    }

    #[test]
    fn test_sqlite_uuid_default() {
        assert_eq!(
            SqliteGenerator.generate(&tsql("(newid())")).unwrap(),
            "(lower(hex(randomblob(16))))"
        );
    }

    #[test]
    fn test_mysql_dateadd_becomes_interval() {
        let sql = MysqlGenerator
            .generate(&tsql("(dateadd(month,(3),getdate()))"))
            .unwrap();
        assert_eq!(sql, "DATE_ADD(NOW(), INTERVAL 3 MONTH)");
    }

    #[test]
    fn test_mysql_literals_and_identifiers() {
        assert_eq!(
            MysqlGenerator.generate(&tsql("(newid())")).unwrap(),
            "uuid()"
        );
        assert_eq!(
            MysqlGenerator
                .generate(&tsql("(CONVERT([bit],(1)))"))
                .unwrap(),
            "1"
        );
        assert_eq!(
            MysqlGenerator.generate(&tsql("([Qty]>(0))")).unwrap(),
            "(`Qty` > 0)"
        );
    }

    #[test]
    fn test_raw_fallback_survives_round_trip() {
        let node = tsql("(isnull([A],[B])*2)");
        let sql = SqliteGenerator.generate(&node).unwrap();
        assert_eq!(sql, "(isnull([A],[B])*2)");
    }

    #[test]
    fn test_conjunction_renders_nested() {
        let sql = PostgresGenerator
            .generate(&tsql("(([Qty]>(0)) AND ([Qty]<(100)))"))
            .unwrap();
        assert_eq!(sql, "((\"Qty\" > 0) AND (\"Qty\" < 100))");
    }
}
