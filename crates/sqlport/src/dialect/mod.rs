//! Per-engine dialect bundles.
//!
//! A [`Dialect`] groups everything engine-specific behind one object:
//! identifier quoting, the type-mapper half of the pivot, the expression
//! parser for reading, and (for writable destinations) the expression
//! generator.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

use std::sync::Arc;

use crate::config::Engine;
use crate::expr::{ExpressionGenerator, ExpressionParser};
use crate::typemap::TypeMapper;

pub trait Dialect: Send + Sync {
    fn engine(&self) -> Engine;

    fn quote_ident(&self, name: &str) -> String;

    fn type_mapper(&self) -> Arc<dyn TypeMapper>;

    fn expression_parser(&self) -> Arc<dyn ExpressionParser>;

    /// `None` for engines that are read-only sources.
    fn expression_generator(&self) -> Option<Arc<dyn ExpressionGenerator>> {
        None
    }
}

/// Base type name: lowercased, facets stripped.
pub(crate) fn base_type(type_name: &str) -> String {
    type_name
        .split('(')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}
