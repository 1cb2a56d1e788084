//! Source-dialect expression parsers.
//!
//! Parsing is total: text that doesn't match a recognized shape becomes a
//! [`LiteralValue::Raw`] node carrying the original text, which generators
//! reproduce verbatim.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::expr::{ExpressionNode, LiteralValue, UniversalFunction};

/// Parses one source dialect's catalog expression text into the shared AST.
pub trait ExpressionParser: Send + Sync {
    fn parse(&self, text: &str) -> ExpressionNode;
}

/// Strip balanced outer parentheses, repeatedly.
///
/// Only strips when the opening paren at index 0 is closed by the final
/// character, so `((a) AND (b))` loses one layer, not two.
fn strip_outer_parens(text: &str) -> &str {
    let mut s = text.trim();
    loop {
        let bytes = s.as_bytes();
        if bytes.len() < 2 || bytes[0] != b'(' || bytes[bytes.len() - 1] != b')' {
            return s;
        }
        let mut depth = 0usize;
        let mut closes_at_end = false;
        for (i, b) in bytes.iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        closes_at_end = i == bytes.len() - 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !closes_at_end {
            return s;
        }
        s = s[1..s.len() - 1].trim();
    }
}

/// Find the first top-level ` AND ` (outside parens and string literals).
fn split_top_level_and(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_string = !in_string,
            b'(' if !in_string => depth += 1,
            b')' if !in_string => depth -= 1,
            // Byte comparison: slicing the &str here could land inside a
            // multibyte character and panic.
            b' ' if !in_string && depth == 0 => {
                if bytes.len() - i >= 5 && bytes[i..i + 5].eq_ignore_ascii_case(b" and ") {
                    return Some((&text[..i], &text[i + 5..]));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn unescape_sql_string(text: &str) -> String {
    text.replace("''", "'")
}

fn parse_number(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim()).ok()
}

/// Parser for SQL Server catalog expressions (defaults and checks as
/// stored in `sys.default_constraints` / `sys.check_constraints`).
pub struct TsqlParser;

static TSQL_DATEADD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^dateadd\s*\(\s*(\w+)\s*,\s*(.+?)\s*,\s*(.+)\s*\)$").unwrap()
});
static TSQL_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^upper\s*\(\s*(.+)\s*\)$").unwrap());
static TSQL_CONVERT_BIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^convert\s*\(\s*\[?bit\]?\s*,\s*(.+)\s*\)$").unwrap());
static TSQL_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^N?'(.*)'$").unwrap());
static TSQL_BINARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\[([^\]]+)\]\s*(>=|<=|<>|!=|=|>|<|like\s|in\s)\s*(.+)$").unwrap()
});
static TSQL_IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]$").unwrap());

impl ExpressionParser for TsqlParser {
    fn parse(&self, text: &str) -> ExpressionNode {
        let original = text.trim();
        let s = strip_outer_parens(original);
        let lower = s.to_lowercase();

        if lower == "null" {
            return ExpressionNode::Literal(LiteralValue::Null);
        }
        if matches!(
            lower.as_str(),
            "getdate()" | "sysdatetime()" | "sysutcdatetime()" | "getutcdate()" | "current_timestamp"
        ) {
            return ExpressionNode::FunctionCall {
                function: UniversalFunction::CurrentTimestamp,
                args: vec![],
            };
        }
        if lower == "newid()" || lower == "newsequentialid()" {
            return ExpressionNode::FunctionCall {
                function: UniversalFunction::GenerateUuid,
                args: vec![],
            };
        }
        if let Some(caps) = TSQL_DATEADD.captures(s) {
            return ExpressionNode::FunctionCall {
                function: UniversalFunction::DateAdd,
                args: vec![
                    ExpressionNode::string(caps[1].to_lowercase()),
                    self.parse(&caps[2]),
                    self.parse(&caps[3]),
                ],
            };
        }
        if let Some(caps) = TSQL_UPPER.captures(s) {
            return ExpressionNode::FunctionCall {
                function: UniversalFunction::Upper,
                args: vec![self.parse(&caps[1])],
            };
        }
        if let Some(caps) = TSQL_CONVERT_BIT.captures(s) {
            let inner = strip_outer_parens(&caps[1]);
            if let Some(n) = parse_number(inner) {
                return ExpressionNode::Literal(LiteralValue::Bool(!n.is_zero()));
            }
            return ExpressionNode::raw(original);
        }
        if let Some(caps) = TSQL_STRING.captures(s) {
            return ExpressionNode::string(unescape_sql_string(&caps[1]));
        }
        if let Some(n) = parse_number(s) {
            return ExpressionNode::Literal(LiteralValue::Number(n));
        }
        if let Some((left, right)) = split_top_level_and(s) {
            return ExpressionNode::Operator {
                symbol: "AND".to_string(),
                left: Box::new(self.parse(left)),
                right: Box::new(self.parse(right)),
            };
        }
        if let Some(caps) = TSQL_BINARY.captures(s) {
            let symbol = caps[2].trim().to_uppercase();
            // IN keeps its parenthesized list verbatim; element-wise
            // translation of list literals gains nothing.
            let right = if symbol == "IN" {
                ExpressionNode::raw(caps[3].trim())
            } else {
                self.parse(&caps[3])
            };
            return ExpressionNode::Operator {
                symbol,
                left: Box::new(ExpressionNode::identifier(&caps[1])),
                right: Box::new(right),
            };
        }
        if let Some(caps) = TSQL_IDENT.captures(s) {
            return ExpressionNode::identifier(&caps[1]);
        }

        ExpressionNode::raw(original)
    }
}

/// Parser for PostgreSQL catalog expressions (`pg_get_expr` output).
pub struct PostgresParser;

static PG_CHECK_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^CHECK\s*\((.*)\)$").unwrap());
static PG_CAST_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^'(.*)'::[\w ]+$").unwrap());
static PG_STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^'(.*)'$").unwrap());
static PG_BINARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^(?:"([^"]+)"|([a-zA-Z_][a-zA-Z0-9_]*))\s*(>=|<=|<>|!=|=|>|<|like\s|in\s)\s*(.+)$"#)
        .unwrap()
});
static PG_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:"([^"]+)"|([a-zA-Z_][a-zA-Z0-9_]*))$"#).unwrap());

impl ExpressionParser for PostgresParser {
    fn parse(&self, text: &str) -> ExpressionNode {
        let original = text.trim();
        let unwrapped = match PG_CHECK_WRAPPER.captures(original) {
            Some(caps) => caps.get(1).map(|m| m.as_str().to_string()),
            None => None,
        };
        let candidate = unwrapped.as_deref().unwrap_or(original);
        let s = strip_outer_parens(candidate);
        let lower = s.to_lowercase();

        if lower == "null" {
            return ExpressionNode::Literal(LiteralValue::Null);
        }
        if matches!(
            lower.as_str(),
            "now()" | "current_timestamp" | "transaction_timestamp()" | "statement_timestamp()"
        ) {
            return ExpressionNode::FunctionCall {
                function: UniversalFunction::CurrentTimestamp,
                args: vec![],
            };
        }
        if lower == "gen_random_uuid()" || lower == "uuid_generate_v4()" {
            return ExpressionNode::FunctionCall {
                function: UniversalFunction::GenerateUuid,
                args: vec![],
            };
        }
        if lower == "true" {
            return ExpressionNode::Literal(LiteralValue::Bool(true));
        }
        if lower == "false" {
            return ExpressionNode::Literal(LiteralValue::Bool(false));
        }
        if let Some(caps) = PG_CAST_STRING.captures(s) {
            return ExpressionNode::string(unescape_sql_string(&caps[1]));
        }
        if let Some(caps) = PG_STRING.captures(s) {
            return ExpressionNode::string(unescape_sql_string(&caps[1]));
        }
        if let Some(n) = parse_number(s) {
            return ExpressionNode::Literal(LiteralValue::Number(n));
        }
        if let Some((left, right)) = split_top_level_and(s) {
            return ExpressionNode::Operator {
                symbol: "AND".to_string(),
                left: Box::new(self.parse(left)),
                right: Box::new(self.parse(right)),
            };
        }
        if let Some(caps) = PG_BINARY.captures(s) {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let symbol = caps[3].trim().to_uppercase();
            let right = if symbol == "IN" {
                ExpressionNode::raw(caps[4].trim())
            } else {
                self.parse(&caps[4])
            };
            return ExpressionNode::Operator {
                symbol,
                left: Box::new(ExpressionNode::identifier(name)),
                right: Box::new(right),
            };
        }
        if let Some(caps) = PG_IDENT.captures(s) {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            return ExpressionNode::identifier(name);
        }

        ExpressionNode::raw(original)
    }
}

/// Fallback parser for dialects without expression recognition.
/// Everything becomes a raw literal.
pub struct RawParser;

impl ExpressionParser for RawParser {
    fn parse(&self, text: &str) -> ExpressionNode {
        ExpressionNode::raw(text.trim())
    }
}
