//! Cross-dialect SQL schema and data migration engine.
//!
//! `sqlport` moves a database from one engine to another: it reads the
//! source schema, orders tables by foreign-key dependency, pivots column
//! types through an engine-neutral generic type, translates default and
//! check expressions through a shared AST, streams table data in batches,
//! and applies secondary constraints last.
//!
//! Concrete wire drivers live outside this crate. Embedders register
//! [`SourceConnector`]/[`TargetConnector`] implementations in a
//! [`DriverCatalog`] and hand it to the [`Orchestrator`]:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sqlport::{
//!     DriverCatalog, Engine, MigrationRequest, Orchestrator, TracingSink,
//! };
//!
//! # async fn run(source_connector: Arc<dyn sqlport::SourceConnector>,
//! #              target_connector: Arc<dyn sqlport::TargetConnector>)
//! #     -> sqlport::Result<()> {
//! let mut catalog = DriverCatalog::with_builtins();
//! catalog.register_source_connector(Engine::SqlServer, source_connector);
//! catalog.register_target_connector(Engine::Sqlite, target_connector);
//!
//! let orchestrator = Orchestrator::new(Arc::new(catalog), Arc::new(TracingSink));
//! let report = orchestrator
//!     .run(&MigrationRequest {
//!         source_dialect: Engine::SqlServer,
//!         destination_dialect: Engine::Sqlite,
//!         source_connection: "Server=localhost;Database=shop".into(),
//!         destination_connection: "/tmp/shop.db".into(),
//!     })
//!     .await?;
//! println!("{} rows transferred", report.rows_transferred);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod orchestrator;
pub mod sorter;
pub mod transfer;
pub mod typemap;

pub use crate::config::{Engine, MigrationRequest};
pub use crate::core::catalog::{
    DriverCatalog, SourceConnector, SourceHandle, TargetConnector, TargetHandle,
};
pub use crate::core::schema::{
    CheckConstraint, Column, ForeignKey, Index, IndexColumn, TableSchema, Trigger, TriggerEvent,
    TriggerTiming, UniqueConstraint, ViewSchema,
};
pub use crate::core::traits::{
    BulkSession, DataReader, DataWriter, ProgressSink, SchemaReader, SchemaWriter, TracingSink,
};
pub use crate::core::value::{Row, Value};
pub use crate::error::{MigrateError, Result};
pub use crate::orchestrator::{MigrationReport, Orchestrator, Phase};
pub use crate::sorter::sort_tables;
pub use crate::transfer::{FailureMode, TransferConfig, TransferEngine, TransferSummary};
pub use crate::typemap::{GenericType, TypeService};
