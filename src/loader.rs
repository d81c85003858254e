use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::SOURCE_EXTENSION;
use crate::error::LoadError;
use crate::formats::DelimitedReader;
use crate::schema::{SchemaRegistry, TableSchema};
use crate::store::{TableStore, WriteMode};
use crate::telemetry::TelemetryEvent;

/// Execution mode for `load_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// One table at a time, in registry order
    Sequential,
    /// At most n tables in flight; completion order is non-deterministic
    Bounded(usize),
}

/// One table's load, constructed per invocation and consumed immediately
#[derive(Debug, Clone)]
pub struct LoadTask {
    pub table_name: String,
    pub source_path: PathBuf,
    pub schema: TableSchema,
}

impl LoadTask {
    fn new(base_path: &Path, schema: &TableSchema) -> Self {
        let table_name = schema.table_name.clone();
        let source_path = base_path.join(format!("{}.{}", table_name, SOURCE_EXTENSION));
        Self {
            table_name,
            source_path,
            schema: schema.clone(),
        }
    }
}

/// Outcome of one table's load
#[derive(Debug)]
pub enum LoadStatus {
    Success,
    Failed(LoadError),
}

/// Per-table result aggregated by the caller for reporting
#[derive(Debug)]
pub struct LoadResult {
    pub table_name: String,
    pub status: LoadStatus,
    pub row_count: Option<u64>,
}

impl LoadResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, LoadStatus::Success)
    }
}

/// Schema-driven bulk loader.
///
/// For each registry entry, reads `{base_path}/{table}.tbl`, conforms it to
/// the table's schema, and overwrites the destination table. Failures are
/// isolated per table: every entry is attempted exactly once and `load_all`
/// always returns one result per entry. Adding a table is purely a registry
/// change; no loading logic is touched.
#[derive(Clone)]
pub struct BulkLoader {
    store: Arc<dyn TableStore>,
    reader: DelimitedReader,
    telemetry_tx: Option<mpsc::UnboundedSender<TelemetryEvent>>,
}

impl BulkLoader {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            reader: DelimitedReader::pipe(),
            telemetry_tx: None,
        }
    }

    /// Attach a telemetry channel for progress tracking
    pub fn with_telemetry(mut self, tx: mpsc::UnboundedSender<TelemetryEvent>) -> Self {
        self.telemetry_tx = Some(tx);
        self
    }

    fn send(&self, event: TelemetryEvent) {
        if let Some(tx) = &self.telemetry_tx {
            let _ = tx.send(event);
        }
    }

    /// Load a single table: read, conform, overwrite.
    ///
    /// Replaces the destination table's contents; this is destructive and
    /// not reversible here. Errors are captured into the returned result.
    pub async fn load_one(
        &self,
        base_path: &Path,
        table_name: &str,
        schema: &TableSchema,
    ) -> LoadResult {
        let task = LoadTask::new(base_path, schema);
        debug_assert_eq!(task.table_name, table_name);

        self.send(TelemetryEvent::TableStarted {
            table_name: task.table_name.clone(),
        });
        let start = Instant::now();

        match self.execute(&task).await {
            Ok(row_count) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    table = %task.table_name,
                    rows = row_count,
                    duration_ms,
                    "table loaded"
                );
                self.send(TelemetryEvent::TableLoaded {
                    table_name: task.table_name.clone(),
                    rows: row_count,
                    duration_ms,
                });
                LoadResult {
                    table_name: task.table_name,
                    status: LoadStatus::Success,
                    row_count: Some(row_count),
                }
            }
            Err(err) => {
                warn!(table = %task.table_name, error = %err, "table load failed");
                self.send(TelemetryEvent::TableFailed {
                    table_name: task.table_name.clone(),
                });
                LoadResult {
                    table_name: task.table_name,
                    status: LoadStatus::Failed(err),
                    row_count: None,
                }
            }
        }
    }

    async fn execute(&self, task: &LoadTask) -> Result<u64, LoadError> {
        let rows = self.reader.read_table(&task.source_path, &task.schema).await?;
        let row_count = rows.len() as u64;

        self.store
            .write_table(&task.table_name, &task.schema, rows, WriteMode::Overwrite)
            .await
            .map_err(|e| LoadError::write(&task.table_name, &e))?;

        Ok(row_count)
    }

    /// Load every table in the registry, once each.
    ///
    /// The first failure does not stop later tasks; the returned vector
    /// holds exactly one result per registry entry in both modes.
    pub async fn load_all(
        &self,
        base_path: &Path,
        registry: &SchemaRegistry,
        mode: LoadMode,
    ) -> Result<Vec<LoadResult>> {
        match mode {
            LoadMode::Sequential => {
                info!(tables = registry.len(), "starting sequential load");
                let mut results = Vec::with_capacity(registry.len());
                for schema in registry.all() {
                    results.push(self.load_one(base_path, &schema.table_name, schema).await);
                }
                Ok(results)
            }
            LoadMode::Bounded(0) => Err(anyhow!("worker bound must be at least 1")),
            LoadMode::Bounded(worker_count) => {
                info!(
                    tables = registry.len(),
                    workers = worker_count,
                    "starting bounded load"
                );

                let mut join_set: JoinSet<LoadResult> = JoinSet::new();
                let mut results = Vec::with_capacity(registry.len());

                for schema in registry.all() {
                    // Wait if we've reached the concurrency limit
                    while join_set.len() >= worker_count {
                        if let Some(joined) = join_set.join_next().await {
                            results.push(joined.map_err(|e| anyhow!("load task panicked: {e}"))?);
                        }
                    }

                    let loader = self.clone();
                    let base_path = base_path.to_path_buf();
                    let schema = schema.clone();
                    join_set.spawn(async move {
                        loader
                            .load_one(&base_path, &schema.table_name, &schema)
                            .await
                    });
                }

                while let Some(joined) = join_set.join_next().await {
                    results.push(joined.map_err(|e| anyhow!("load task panicked: {e}"))?);
                }

                Ok(results)
            }
        }
    }
}
