use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::schema::TableSchema;

use super::table_store::{Row, TableStore, Value, WriteMode};

/// On-disk document holding one full table version
#[derive(Debug, Serialize, Deserialize)]
struct TableDocument {
    table_name: String,
    /// Monotonically increasing; bumped on every overwrite.
    version: u64,
    written_at: String, // ISO 8601
    row_count: u64,
    schema: TableSchema,
    rows: Vec<Row>,
}

/// Local filesystem implementation of `TableStore`.
///
/// Directory structure:
///   {base_dir}/tables/{name}/table.json
///
/// Overwrites are staged into a temp file in the same directory and renamed
/// into place, so a reader always observes either the old or the new full
/// document. Concurrent writes to *different* table names touch disjoint
/// directories; concurrent writes to the same name are not supported.
pub struct LocalTableStore {
    base_dir: PathBuf,
}

impl LocalTableStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn table_dir(&self, name: &str) -> PathBuf {
        self.base_dir.join("tables").join(name)
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.table_dir(name).join("table.json")
    }

    async fn read_document(&self, name: &str) -> Result<Option<TableDocument>> {
        let path = self.table_path(name);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to read table document"),
        };

        let doc: TableDocument =
            serde_json::from_str(&contents).context("Failed to parse table document")?;
        Ok(Some(doc))
    }
}

#[async_trait]
impl TableStore for LocalTableStore {
    async fn write_table(
        &self,
        name: &str,
        schema: &TableSchema,
        rows: Vec<Row>,
        mode: WriteMode,
    ) -> Result<()> {
        let WriteMode::Overwrite = mode;

        let table_dir = self.table_dir(name);
        fs::create_dir_all(&table_dir)
            .await
            .context("Failed to create table directory")?;

        // Prior version number survives the overwrite
        let version = match self.read_document(name).await {
            Ok(Some(prev)) => prev.version + 1,
            _ => 1,
        };

        let doc = TableDocument {
            table_name: name.to_string(),
            version,
            written_at: Utc::now().to_rfc3339(),
            row_count: rows.len() as u64,
            schema: schema.clone(),
            rows,
        };

        let json = serde_json::to_string_pretty(&doc).context("Failed to serialize table")?;

        // Stage then rename so readers never see a partially written table
        let tmp_path = table_dir.join(".table.json.tmp");
        fs::write(&tmp_path, json)
            .await
            .context("Failed to write staged table file")?;
        fs::rename(&tmp_path, self.table_path(name))
            .await
            .context("Failed to commit table file")?;

        Ok(())
    }

    async fn read_rows(&self, name: &str) -> Result<Vec<Row>> {
        let doc = self
            .read_document(name)
            .await?
            .with_context(|| format!("Table '{}' does not exist", name))?;
        Ok(doc.rows)
    }

    async fn count_rows(&self, name: &str) -> Result<Option<u64>> {
        Ok(self.read_document(name).await?.map(|doc| doc.row_count))
    }
}
