//! Core abstractions: schema model, value model, capability traits,
//! driver catalog, and identifier quoting.

pub mod catalog;
pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;
