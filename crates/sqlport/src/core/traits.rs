//! Capability traits implemented by engine drivers.
//!
//! The migration engine is written entirely against these traits; concrete
//! wire drivers live outside this crate and are registered through the
//! [`DriverCatalog`](crate::core::catalog::DriverCatalog).

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::Engine;
use crate::core::schema::{TableSchema, ViewSchema};
use crate::core::value::Row;
use crate::error::{MigrateError, Result};
use crate::typemap::TypeService;

/// Reads schema metadata from a source database.
#[async_trait]
pub trait SchemaReader: Send + Sync {
    /// All user tables with columns, keys, constraints, indexes, and
    /// triggers populated. Expression fields carry raw source text.
    async fn get_tables(&self) -> Result<Vec<TableSchema>>;

    /// All user views with their raw definitions.
    async fn get_views(&self) -> Result<Vec<ViewSchema>>;

    async fn close(&self) -> Result<()>;
}

/// Writes schema objects to a destination database.
#[async_trait]
pub trait SchemaWriter: Send + Sync {
    /// Create tables (and trigger placeholders) in the given
    /// (dependency-sorted) order.
    ///
    /// Receives the type service and the source engine tag so column
    /// types can be pivoted into destination DDL.
    async fn write_schema(
        &self,
        tables: &[TableSchema],
        types: &TypeService,
        source: Engine,
    ) -> Result<()>;

    /// Create view placeholders.
    async fn write_views(&self, views: &[ViewSchema]) -> Result<()>;

    /// Apply deferred secondary objects, in order: unique constraints,
    /// foreign keys, check constraints, indexes.
    ///
    /// Individual failures are reported through the sink as warnings and
    /// do not abort the phase.
    async fn write_constraints_and_indexes(
        &self,
        tables: &[TableSchema],
        sink: &dyn ProgressSink,
    ) -> Result<()>;

    /// Hook run before any data is written (e.g. disable FK enforcement).
    async fn pre_migration(&self) -> Result<()> {
        Ok(())
    }

    /// Hook run after data transfer, even when the transfer failed
    /// (e.g. re-enable FK enforcement).
    async fn post_migration(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()>;
}

/// Streams table data out of a source database.
#[async_trait]
pub trait DataReader: Send + Sync {
    /// Open a row stream for one table, in declared column order.
    ///
    /// Read errors are delivered in-band on the channel; a closed channel
    /// with no error means the table is exhausted.
    async fn read_table(&self, table: &TableSchema) -> Result<mpsc::Receiver<Result<Row>>>;

    async fn close(&self) -> Result<()>;
}

/// Writes table data into a destination database.
#[async_trait]
pub trait DataWriter: Send + Sync {
    /// Whether this writer prefers a single bulk session per table over
    /// batched inserts.
    fn supports_bulk(&self) -> bool {
        false
    }

    /// Open a bulk-load session for one table.
    async fn begin_bulk(&self, table: &TableSchema) -> Result<Box<dyn BulkSession>> {
        Err(MigrateError::Schema(format!(
            "Bulk import not supported for table {}",
            table.name
        )))
    }

    /// Write one batch of rows, returning the count written.
    ///
    /// Each call is an atomic unit: on error no row of the batch is
    /// considered written.
    async fn write_batch(&self, table: &TableSchema, rows: &[Row]) -> Result<u64>;

    async fn close(&self) -> Result<()>;
}

/// One in-flight bulk load. The session owns the destination transaction;
/// rows become visible only when [`finish`](BulkSession::finish) commits.
#[async_trait]
pub trait BulkSession: Send {
    async fn write_row(&mut self, row: &Row) -> Result<()>;

    /// Commit the session and return the number of rows written.
    async fn finish(self: Box<Self>) -> Result<u64>;
}

/// Receives human-readable progress during a migration run.
///
/// Exactly one terminal call is made per run: `success` or `failure`.
pub trait ProgressSink: Send + Sync {
    fn log(&self, message: &str);

    fn warn(&self, message: &str);

    /// Cumulative row-count progress for a table mid-transfer.
    fn progress(&self, table: &str, rows: u64);

    fn success(&self, message: &str);

    /// Terminal failure with a one-line message and a detailed rendering
    /// (including the error source chain).
    fn failure(&self, message: &str, detail: &str);
}

/// [`ProgressSink`] that forwards to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn progress(&self, table: &str, rows: u64) {
        tracing::info!(table, rows, "transfer progress");
    }

    fn success(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn failure(&self, message: &str, detail: &str) {
        tracing::error!("{}\n{}", message, detail);
    }
}
