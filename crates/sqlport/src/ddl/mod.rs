//! Destination DDL builders.
//!
//! Builders are pure: they turn schema structures into SQL text and never
//! touch a connection. Destination schema writers execute what these
//! produce.

pub mod postgres;
pub mod sqlite;

use crate::config::Engine;
use crate::core::schema::Column;
use crate::error::Result;
use crate::typemap::TypeService;

/// Destination type text for one column, with the unmapped-type fallback.
///
/// An unmapped source type degrades to TEXT with a warning instead of
/// failing the table.
pub(crate) fn column_type(
    column: &Column,
    types: &TypeService,
    source: Engine,
    dest: Engine,
) -> Result<String> {
    let translation = types.translate(column, source, dest)?;
    match translation.ddl {
        Some(ddl) => Ok(ddl),
        None => {
            if let Some(warning) = translation.warning {
                tracing::warn!("{}; falling back to TEXT", warning);
            }
            Ok("TEXT".to_string())
        }
    }
}

/// Escape a comment-closing sequence so source SQL can be embedded in a
/// block comment.
pub(crate) fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}
