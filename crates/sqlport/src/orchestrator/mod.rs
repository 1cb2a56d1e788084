//! Migration orchestrator: validate, connect, schema, data, constraints.
//!
//! The orchestrator owns phase ordering and connection lifetime; all
//! engine-specific behavior is reached through the catalog. Every run ends
//! with exactly one terminal sink call, `success` or `failure`, and
//! connections are closed on every path.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::config::MigrationRequest;
use crate::core::catalog::{DriverCatalog, SourceHandle, TargetHandle};
use crate::core::traits::ProgressSink;
use crate::dialect::Dialect;
use crate::error::{MigrateError, Result};
use crate::expr::annotate_tables;
use crate::sorter::sort_tables;
use crate::transfer::{TransferConfig, TransferEngine};
use crate::typemap::TypeService;

/// Phases of a migration run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Connecting,
    Schema,
    Data,
    Constraints,
    Succeeded,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Validating => "validating",
            Phase::Connecting => "connecting",
            Phase::Schema => "schema",
            Phase::Data => "data",
            Phase::Constraints => "constraints",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome summary of a completed migration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub tables_migrated: usize,
    pub views_migrated: usize,
    pub rows_transferred: u64,
    pub duration_seconds: f64,
}

pub struct Orchestrator {
    catalog: Arc<DriverCatalog>,
    sink: Arc<dyn ProgressSink>,
    transfer: TransferConfig,
}

impl Orchestrator {
    pub fn new(catalog: Arc<DriverCatalog>, sink: Arc<dyn ProgressSink>) -> Self {
        Orchestrator {
            catalog,
            sink,
            transfer: TransferConfig::default(),
        }
    }

    pub fn with_transfer_config(mut self, transfer: TransferConfig) -> Self {
        self.transfer = transfer;
        self
    }

    /// Run a migration to completion.
    ///
    /// Exactly one terminal sink call is made: `success` on `Ok`,
    /// `failure` (with the detailed error chain) on `Err`.
    pub async fn run(&self, request: &MigrationRequest) -> Result<MigrationReport> {
        match self.run_inner(request).await {
            Ok(report) => {
                self.sink.success(&format!(
                    "Migration complete: {} tables, {} views, {} rows in {:.1}s",
                    report.tables_migrated,
                    report.views_migrated,
                    report.rows_transferred,
                    report.duration_seconds
                ));
                Ok(report)
            }
            Err(err) => {
                self.phase(Phase::Failed);
                self.sink.failure(&err.to_string(), &err.format_detailed());
                Err(err)
            }
        }
    }

    async fn run_inner(&self, request: &MigrationRequest) -> Result<MigrationReport> {
        let start = Instant::now();

        self.phase(Phase::Validating);
        request.validate()?;
        let source_dialect = self.catalog.require_dialect(request.source_dialect)?;
        let dest_dialect = self.catalog.require_dialect(request.destination_dialect)?;
        if dest_dialect.expression_generator().is_none() {
            return Err(MigrateError::Validation(format!(
                "Engine {} is not a writable destination",
                request.destination_dialect
            )));
        }
        let source_connector = self.catalog.require_source_connector(request.source_dialect)?;
        let target_connector = self
            .catalog
            .require_target_connector(request.destination_dialect)?;

        self.phase(Phase::Connecting);
        if request.destination_dialect.is_file_backed() {
            prepare_destination_file(&request.destination_connection).await?;
        }
        let source = source_connector
            .connect(&request.source_connection)
            .await?;
        let target = match target_connector
            .connect(&request.destination_connection)
            .await
        {
            Ok(target) => target,
            Err(err) => {
                close_source(&source).await;
                return Err(err);
            }
        };

        let result = self
            .execute(request, source_dialect.as_ref(), &source, &target, start)
            .await;

        close_source(&source).await;
        close_target(&target).await;
        result
    }

    async fn execute(
        &self,
        request: &MigrationRequest,
        source_dialect: &dyn Dialect,
        source: &SourceHandle,
        target: &TargetHandle,
        start: Instant,
    ) -> Result<MigrationReport> {
        self.phase(Phase::Schema);
        let tables = source.schema.get_tables().await?;
        self.sink
            .log(&format!("Read {} tables from source", tables.len()));
        let mut tables = sort_tables(tables)?;
        let parser = source_dialect.expression_parser();
        annotate_tables(&mut tables, parser.as_ref());
        let types = TypeService::from_catalog(&self.catalog);
        target
            .schema
            .write_schema(&tables, &types, request.source_dialect)
            .await?;
        let views = source.schema.get_views().await?;
        target.schema.write_views(&views).await?;

        self.phase(Phase::Data);
        target.schema.pre_migration().await?;
        let engine = TransferEngine::new(self.transfer.clone());
        let data_result = engine
            .run(
                source.data.as_ref(),
                target.data.as_ref(),
                &tables,
                self.sink.as_ref(),
            )
            .await;
        // The post hook re-enables whatever pre disabled, so it runs even
        // when the transfer failed.
        let post_result = target.schema.post_migration().await;
        let summary = data_result?;
        post_result?;

        self.phase(Phase::Constraints);
        target
            .schema
            .write_constraints_and_indexes(&tables, self.sink.as_ref())
            .await?;

        self.phase(Phase::Succeeded);
        Ok(MigrationReport {
            tables_migrated: summary.tables_completed,
            views_migrated: views.len(),
            rows_transferred: summary.rows_written,
            duration_seconds: start.elapsed().as_secs_f64(),
        })
    }

    fn phase(&self, phase: Phase) {
        tracing::info!(%phase, "migration phase");
        self.sink.log(&format!("Phase: {}", phase));
    }
}

async fn close_source(source: &SourceHandle) {
    if let Err(err) = source.data.close().await {
        tracing::warn!("error closing source data connection: {}", err);
    }
    if let Err(err) = source.schema.close().await {
        tracing::warn!("error closing source schema connection: {}", err);
    }
}

async fn close_target(target: &TargetHandle) {
    if let Err(err) = target.data.close().await {
        tracing::warn!("error closing target data connection: {}", err);
    }
    if let Err(err) = target.schema.close().await {
        tracing::warn!("error closing target schema connection: {}", err);
    }
}

/// Clean slate for a file-backed destination: create the parent directory,
/// delete any previous file.
async fn prepare_destination_file(path: &str) -> Result<()> {
    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
