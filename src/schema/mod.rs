//! Static table schema configuration

pub mod registry;
pub mod types;

pub use registry::SchemaRegistry;
pub use types::{ColumnDefinition, ColumnType, TableSchema};
