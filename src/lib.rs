// Public API - the runner plus the pieces it hands out
pub mod error;
pub mod loader;
pub mod runner;
pub mod schema;
pub mod store;
pub mod telemetry;

// Internal modules - organized by subsystem
mod config;
mod formats;

pub use config::default_worker_count;

#[cfg(test)]
mod integ_tests;
