//! Engine-neutral schema model.
//!
//! Readers populate these structures from catalog queries; the sorter,
//! type service, and DDL builders consume them. Default and check
//! expressions arrive as raw source text (`default_text`, `definition`) and
//! are annotated with parsed ASTs before schema generation.

use serde::{Deserialize, Serialize};

use crate::expr::ExpressionNode;

/// A table captured from the source catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Source namespace (e.g. `dbo`). Informational; destination naming
    /// is flat.
    pub schema: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
    pub check_constraints: Vec<CheckConstraint>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub triggers: Vec<Trigger>,
}

/// A column definition in source-dialect terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Source type name, possibly with a parenthesized facet,
    /// e.g. `nvarchar(50)`.
    pub data_type: String,
    pub length: Option<i32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub is_nullable: bool,
    pub is_identity: bool,
    /// Raw default expression text as read from the source catalog.
    pub default_text: Option<String>,
    /// Parsed default expression, filled in by annotation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_ast: Option<ExpressionNode>,
}

impl Column {
    /// Facet view consumed by type mappers.
    pub fn column_info(&self) -> DbColumnInfo {
        DbColumnInfo {
            type_name: self.data_type.clone(),
            length: self.length,
            precision: self.precision,
            scale: self.scale,
        }
    }

    /// Whether the column's source type is string-like.
    ///
    /// Drives the NOT NULL repair rule: a null read from a NOT NULL
    /// string column becomes the empty string rather than failing the row.
    pub fn is_string_like(&self) -> bool {
        let base = self
            .data_type
            .split('(')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        matches!(
            base.as_str(),
            "varchar"
                | "nvarchar"
                | "char"
                | "nchar"
                | "text"
                | "ntext"
                | "character varying"
                | "character"
                | "clob"
                | "tinytext"
                | "mediumtext"
                | "longtext"
        )
    }
}

/// Type facets handed to a destination mapper when rendering DDL.
#[derive(Debug, Clone, Default)]
pub struct DbColumnInfo {
    pub type_name: String,
    pub length: Option<i32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

/// A foreign-key constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    /// Referential action text (`CASCADE`, `SET NULL`, `NO ACTION`, ...).
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// A secondary index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub is_unique: bool,
    pub columns: Vec<IndexColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    pub ascending: bool,
}

/// A check constraint with its raw source definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConstraint {
    pub name: String,
    /// Raw definition text as read from the source catalog.
    pub definition: String,
    /// Parsed expression, filled in by annotation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub check_ast: Option<ExpressionNode>,
}

/// A unique constraint (distinct from a unique index).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl TriggerEvent {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TriggerEvent::Insert => "INSERT",
            TriggerEvent::Update => "UPDATE",
            TriggerEvent::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

/// A trigger captured from the source.
///
/// Trigger bodies are procedural source-dialect SQL and are not translated;
/// destinations emit a placeholder carrying the original body in a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    pub table: String,
    pub event: TriggerEvent,
    pub timing: TriggerTiming,
    pub body: String,
}

/// A view captured from the source. Definitions are not translated;
/// destinations emit a placeholder carrying the original SQL in a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSchema {
    pub name: String,
    pub definition: String,
}
