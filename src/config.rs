//! Configuration constants for the loader
//!
//! This module centralizes the tunable parameters and dbgen file-format
//! conventions used throughout the application.

/// File extension of the TPC-H flat files produced by dbgen.
pub const SOURCE_EXTENSION: &str = "tbl";

/// Field separator used by the TPC-H flat files.
pub const FIELD_DELIMITER: u8 = b'|';

/// Default worker bound for the `Bounded` load mode.
///
/// Capped at the host's available parallelism: every load task is dominated
/// by blocking file reads and store writes, so additional in-flight tasks
/// beyond the hardware threads only add contention.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
