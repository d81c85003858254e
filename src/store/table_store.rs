use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::TableSchema;

/// A typed cell value conformed to a column's declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Null,
}

/// A single conformed row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Value>,
}

/// Write disposition for `write_table`.
///
/// Overwrite is the only mode the loader uses: the destination either holds
/// the old full table or the new full table, never a partial mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
}

/// Trait for the destination table store.
///
/// Abstracts the managed table storage the loader writes into. The loader
/// consumes `write_table`; `read_rows` and `count_rows` serve the
/// verification pass only. Implementations must serialize concurrent
/// overwrites to different table names safely.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Replace the full contents of `name` with `rows`.
    async fn write_table(
        &self,
        name: &str,
        schema: &TableSchema,
        rows: Vec<Row>,
        mode: WriteMode,
    ) -> Result<()>;

    /// Read back all rows of a table.
    async fn read_rows(&self, name: &str) -> Result<Vec<Row>>;

    /// Row count for a table, or None if the table does not exist.
    async fn count_rows(&self, name: &str) -> Result<Option<u64>>;
}
