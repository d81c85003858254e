//! High-level runner API for the bulk loader.
//!
//! This module provides the public interface that wires together the schema
//! registry, the destination store, and the bulk loader, and aggregates a
//! load summary. This is the primary API for external users and for the CLI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::loader::{BulkLoader, LoadMode, LoadResult};
use crate::schema::SchemaRegistry;
use crate::store::{LocalTableStore, TableStore};
use crate::telemetry::{ProgressStats, TelemetryEvent};

/// Arguments for running a data load operation
#[derive(Debug, Clone)]
pub struct LoadArgs {
    /// Directory holding the source flat files
    pub base_path: PathBuf,
    /// Base directory of the destination table store
    pub destination: PathBuf,
    pub mode: LoadMode,
    /// Suppress the progress bar
    pub quiet: bool,
}

/// Aggregated outcome of a completed load
#[derive(Debug)]
pub struct LoadSummary {
    pub results: Vec<LoadResult>,
    pub tables_loaded: usize,
    pub tables_failed: usize,
    pub rows_loaded: u64,
    pub duration: Duration,
}

/// Run a load of the full TPC-H registry against a local table store.
///
/// Builds the registry, store, and loader, runs `load_all` in the requested
/// mode, and aggregates the per-table results into a summary. Per-table
/// failures are reported in the summary, not returned as an error.
pub async fn run_load(args: LoadArgs) -> Result<LoadSummary> {
    let registry = SchemaRegistry::tpch();
    let store: Arc<dyn TableStore> = Arc::new(LocalTableStore::new(args.destination.clone()));

    let (telemetry_tx, telemetry_rx) = mpsc::unbounded_channel::<TelemetryEvent>();
    let loader = BulkLoader::new(Arc::clone(&store)).with_telemetry(telemetry_tx);

    let progress_handle = setup_progress_tracking(&registry, args.quiet, telemetry_rx);

    let start = Instant::now();
    let results = loader.load_all(&args.base_path, &registry, args.mode).await?;
    let duration = start.elapsed();

    // Drop the loader's telemetry sender so the progress task sees the
    // channel close and finishes its bar
    drop(loader);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let tables_loaded = results.iter().filter(|r| r.is_success()).count();
    let tables_failed = results.len() - tables_loaded;
    let rows_loaded = results.iter().filter_map(|r| r.row_count).sum();

    Ok(LoadSummary {
        results,
        tables_loaded,
        tables_failed,
        rows_loaded,
        duration,
    })
}

/// Row-count verification: one count per registry table, in registry order.
///
/// The counting itself is the store's; this only supplies the table list.
/// `None` means the table does not exist in the store.
pub async fn verify_counts(
    store: &dyn TableStore,
    registry: &SchemaRegistry,
) -> Result<Vec<(String, Option<u64>)>> {
    let mut counts = Vec::with_capacity(registry.len());
    for schema in registry.all() {
        let count = store.count_rows(&schema.table_name).await?;
        counts.push((schema.table_name.clone(), count));
    }
    Ok(counts)
}

/// Spawn a task that drives a table-level progress bar from telemetry events
fn setup_progress_tracking(
    registry: &SchemaRegistry,
    quiet: bool,
    mut telemetry_rx: mpsc::UnboundedReceiver<TelemetryEvent>,
) -> Option<tokio::task::JoinHandle<()>> {
    if quiet {
        return None;
    }

    let bar = ProgressBar::new(registry.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(
                "[{elapsed_precise}] Tables: [{bar:30.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap()
            .progress_chars("=>-"),
    );

    Some(tokio::spawn(async move {
        let mut stats = ProgressStats::new();

        while let Some(event) = telemetry_rx.recv().await {
            stats.update(&event);

            match &event {
                TelemetryEvent::TableStarted { table_name } => {
                    bar.set_message(format!("loading {table_name}"));
                }
                TelemetryEvent::TableLoaded { .. } | TelemetryEvent::TableFailed { .. } => {
                    bar.set_position(stats.tables_completed as u64);
                    bar.set_message(format!("{} rows", stats.rows_loaded));
                }
            }
        }

        if let Some(p50) = stats.percentile(50.0) {
            bar.finish_with_message(format!(
                "{} rows, p50 table load {}ms",
                stats.rows_loaded, p50
            ));
        } else {
            bar.finish();
        }
    }))
}
