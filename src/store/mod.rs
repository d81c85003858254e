//! Destination table store - trait seam and local implementation

pub mod local;
pub mod table_store;

pub use local::LocalTableStore;
pub use table_store::{Row, TableStore, Value, WriteMode};
