//! Engine-neutral runtime value model for data transfer.
//!
//! Every source reader decodes its wire format into [`Value`] and every
//! destination writer encodes from it, so the transfer engine never touches
//! driver-specific types.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single cell value in transit between a source and a destination.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Elapsed time (e.g. SQL Server `time` read as a span). Normalized to
    /// a time-of-day before writing.
    Duration(chrono::Duration),
    /// Textual rendering of a type with no engine-neutral shape
    /// (spatial types, hierarchy ids). Carried as text.
    Opaque(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// One row of values, in the declared column order of its table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }
}
