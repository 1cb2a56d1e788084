//! Row normalization applied between reading and writing.
//!
//! Rules, in order:
//! 1. Text is trimmed; all-whitespace text becomes NULL.
//! 2. Durations become a time of day (wrapping at 24h).
//! 3. Opaque values degrade to their textual rendering.
//! 4. NULL in a NOT NULL string-like column becomes the empty string, so
//!    dirty source data loads instead of failing the batch.

use chrono::NaiveTime;

use crate::core::schema::Column;
use crate::core::value::{Row, Value};

pub fn normalize_row(row: Row, columns: &[Column]) -> Row {
    let values = row
        .values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match columns.get(i) {
            Some(column) => normalize_value(v, column),
            None => v,
        })
        .collect();
    Row { values }
}

pub fn normalize_value(value: Value, column: &Column) -> Value {
    let value = match value {
        Value::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Value::Null
            } else if trimmed.len() == text.len() {
                Value::Text(text)
            } else {
                Value::Text(trimmed.to_string())
            }
        }
        Value::Duration(d) => {
            let seconds = d.num_seconds().rem_euclid(86_400) as u32;
            Value::Time(
                NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
                    .unwrap_or(NaiveTime::MIN),
            )
        }
        Value::Opaque(text) => Value::Text(text),
        other => other,
    };

    if value.is_null() && !column.is_nullable && column.is_string_like() {
        return Value::Text(String::new());
    }
    value
}
