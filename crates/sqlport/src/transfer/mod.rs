//! Streaming data transfer between a source reader and a destination writer.
//!
//! Rows flow through a bounded channel one table at a time, normalized in
//! transit, and land either through one bulk session per table or through
//! fixed-size batches, depending on what the writer supports.

pub mod normalize;

use serde::{Deserialize, Serialize};

use crate::core::schema::TableSchema;
use crate::core::traits::{DataReader, DataWriter, ProgressSink};
use crate::core::value::Row;
use crate::error::{MigrateError, Result};
use crate::transfer::normalize::normalize_row;

/// What to do when one table's transfer fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Stop the migration at the first failed table.
    #[default]
    Abort,
    /// Warn, leave the table partially loaded, and continue with the rest.
    SkipTable,
}

/// Tuning knobs for the transfer phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Rows per write for batch-mode writers.
    pub batch_size: usize,
    /// Emit a progress report at least every this many rows.
    pub progress_interval: u64,
    pub failure_mode: FailureMode,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            batch_size: 2_000,
            progress_interval: 500,
            failure_mode: FailureMode::Abort,
        }
    }
}

/// What the transfer phase accomplished.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferSummary {
    pub rows_written: u64,
    /// Tables transferred to completion. Skipped and failed tables are
    /// not counted.
    pub tables_completed: usize,
}

pub struct TransferEngine {
    config: TransferConfig,
}

impl TransferEngine {
    pub fn new(config: TransferConfig) -> Self {
        TransferEngine { config }
    }

    /// Transfer all tables in the given order.
    pub async fn run(
        &self,
        reader: &dyn DataReader,
        writer: &dyn DataWriter,
        tables: &[TableSchema],
        sink: &dyn ProgressSink,
    ) -> Result<TransferSummary> {
        let mut summary = TransferSummary::default();
        for table in tables {
            if table.columns.is_empty() {
                sink.warn(&format!("Skipping table {} with no columns", table.name));
                continue;
            }
            sink.log(&format!("Transferring data for table {}", table.name));
            match self.migrate_table(reader, writer, table, sink).await {
                Ok(rows) => {
                    tracing::info!(table = %table.name, rows, "table transfer complete");
                    summary.rows_written += rows;
                    summary.tables_completed += 1;
                }
                Err(err) => {
                    let err = match err {
                        transfer @ MigrateError::Transfer { .. } => transfer,
                        other => MigrateError::transfer(&table.name, other.to_string()),
                    };
                    match self.config.failure_mode {
                        FailureMode::Abort => return Err(err),
                        FailureMode::SkipTable => {
                            sink.warn(&format!("{}; continuing with remaining tables", err));
                        }
                    }
                }
            }
        }
        Ok(summary)
    }

    async fn migrate_table(
        &self,
        reader: &dyn DataReader,
        writer: &dyn DataWriter,
        table: &TableSchema,
        sink: &dyn ProgressSink,
    ) -> Result<u64> {
        let mut rx = reader.read_table(table).await?;

        let interval = self.config.progress_interval.max(1);
        let written = if writer.supports_bulk() {
            let mut session = writer.begin_bulk(table).await?;
            let mut count = 0u64;
            while let Some(result) = rx.recv().await {
                let row = normalize_row(result?, &table.columns);
                session.write_row(&row).await?;
                count += 1;
                if count % interval == 0 {
                    sink.progress(&table.name, count);
                }
            }
            session.finish().await?
        } else {
            let mut batch: Vec<Row> = Vec::with_capacity(self.config.batch_size);
            let mut written = 0u64;
            let mut last_reported = 0u64;
            while let Some(result) = rx.recv().await {
                batch.push(normalize_row(result?, &table.columns));
                if batch.len() >= self.config.batch_size {
                    written += writer.write_batch(table, &batch).await?;
                    batch.clear();
                    if written - last_reported >= interval {
                        sink.progress(&table.name, written);
                        last_reported = written;
                    }
                }
            }
            if !batch.is_empty() {
                written += writer.write_batch(table, &batch).await?;
            }
            written
        };

        sink.progress(&table.name, written);
        Ok(written)
    }
}
