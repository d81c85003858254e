/// Telemetry events sent from load tasks to the runner for progress tracking
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// A table load started
    TableStarted { table_name: String },
    /// A table was loaded successfully
    TableLoaded {
        table_name: String,
        rows: u64,
        duration_ms: u64,
    },
    /// A table load failed
    TableFailed { table_name: String },
}

/// Statistics aggregated from telemetry events
#[derive(Debug, Default, Clone)]
pub struct ProgressStats {
    pub tables_started: usize,
    pub tables_completed: usize,
    pub tables_failed: usize,
    pub rows_loaded: u64,
    pub load_durations_ms: Vec<u64>,
}

impl ProgressStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a telemetry event
    pub fn update(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::TableStarted { .. } => {
                self.tables_started += 1;
            }
            TelemetryEvent::TableLoaded {
                rows, duration_ms, ..
            } => {
                self.tables_completed += 1;
                self.rows_loaded += rows;
                self.load_durations_ms.push(*duration_ms);
            }
            TelemetryEvent::TableFailed { .. } => {
                self.tables_completed += 1;
                self.tables_failed += 1;
            }
        }
    }

    /// Calculate percentile from per-table load durations
    pub fn percentile(&self, p: f64) -> Option<u64> {
        if self.load_durations_ms.is_empty() {
            return None;
        }

        let mut sorted = self.load_durations_ms.clone();
        sorted.sort_unstable();

        let index = ((p / 100.0) * sorted.len() as f64).ceil() as usize - 1;
        let index = index.min(sorted.len() - 1);

        Some(sorted[index])
    }
}
