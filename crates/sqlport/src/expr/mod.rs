//! Engine-neutral expression AST for default values and check constraints.
//!
//! Source parsers recognize a small surface of catalog expressions
//! (literals, identifiers, comparison/boolean operators, and a handful of
//! universal functions). Anything unrecognized degrades to a raw literal
//! carrying the original text, so parsing is total and never fails a
//! migration on its own.

pub mod generate;
pub mod parse;

pub use generate::{ExpressionGenerator, MysqlGenerator, PostgresGenerator, SqliteGenerator};
pub use parse::{ExpressionParser, PostgresParser, RawParser, TsqlParser};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::schema::TableSchema;

/// Functions with a known equivalent in every destination that supports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniversalFunction {
    /// Current date and time (`getdate()`, `now()`, `CURRENT_TIMESTAMP`).
    CurrentTimestamp,
    /// Random UUID (`newid()`, `gen_random_uuid()`).
    GenerateUuid,
    /// Uppercase a string argument.
    Upper,
    /// Date arithmetic: args are `[part, amount, date]`.
    DateAdd,
}

impl UniversalFunction {
    pub fn name(&self) -> &'static str {
        match self {
            UniversalFunction::CurrentTimestamp => "CURRENT_TIMESTAMP",
            UniversalFunction::GenerateUuid => "GENERATE_UUID",
            UniversalFunction::Upper => "UPPER",
            UniversalFunction::DateAdd => "DATE_ADD",
        }
    }
}

/// A literal value inside an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(Decimal),
    String(String),
    /// Unrecognized source text, reproduced verbatim by generators.
    Raw(String),
}

/// One node of a parsed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionNode {
    Literal(LiteralValue),
    Identifier {
        name: String,
    },
    Operator {
        symbol: String,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    FunctionCall {
        function: UniversalFunction,
        args: Vec<ExpressionNode>,
    },
}

impl ExpressionNode {
    pub fn raw(text: impl Into<String>) -> Self {
        ExpressionNode::Literal(LiteralValue::Raw(text.into()))
    }

    pub fn string(text: impl Into<String>) -> Self {
        ExpressionNode::Literal(LiteralValue::String(text.into()))
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        ExpressionNode::Identifier { name: name.into() }
    }
}

/// Fill in parsed ASTs for every column default and check constraint.
///
/// Run once after schema capture, with the parser matching the source
/// dialect. Readers only ever supply raw text.
pub fn annotate_tables(tables: &mut [TableSchema], parser: &dyn ExpressionParser) {
    for table in tables {
        for column in &mut table.columns {
            if let Some(text) = &column.default_text {
                column.default_ast = Some(parser.parse(text));
            }
        }
        for check in &mut table.check_constraints {
            check.check_ast = Some(parser.parse(&check.definition));
        }
    }
}
