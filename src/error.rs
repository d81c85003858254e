use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a single table.
///
/// Each variant is captured into the table's `LoadResult` by `load_all`;
/// one table's failure never aborts its siblings.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source flat file for the table does not exist.
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// A source row does not conform to the table's declared schema,
    /// either in field count or in a per-column type coercion.
    #[error("schema mismatch in table '{table}' at line {line}: {reason}")]
    SchemaMismatch {
        table: String,
        line: u64,
        reason: String,
    },

    /// The destination store failed to complete the overwrite.
    #[error("failed to write table '{table}': {reason}")]
    Write { table: String, reason: String },

    /// The requested table name is not present in the schema registry.
    #[error("unknown table '{0}' in schema registry")]
    UnknownTable(String),
}

impl LoadError {
    pub fn schema_mismatch(table: &str, line: u64, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.to_string(),
            line,
            reason: reason.into(),
        }
    }

    pub fn write(table: &str, err: &anyhow::Error) -> Self {
        Self::Write {
            table: table.to_string(),
            reason: format!("{err:#}"),
        }
    }
}
