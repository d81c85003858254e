use std::path::Path;

use chrono::NaiveDate;
use tokio::fs;

use crate::config::FIELD_DELIMITER;
use crate::error::LoadError;
use crate::schema::{ColumnDefinition, ColumnType, TableSchema};
use crate::store::{Row, Value};

/// Reader for delimited flat files with no header row.
///
/// Parses the raw bytes with the csv crate and conforms every record to a
/// table schema: the field count must match the column count and each field
/// must coerce to its column's declared type. dbgen terminates every row
/// with a field separator, so exactly one trailing empty field beyond the
/// schema width is accepted and discarded.
#[derive(Clone, Copy)]
pub struct DelimitedReader {
    delimiter: u8,
}

impl DelimitedReader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Reader for the pipe-delimited TPC-H files.
    pub fn pipe() -> Self {
        Self::new(FIELD_DELIMITER)
    }

    /// Read a source file and conform it to `schema`.
    pub async fn read_table(&self, path: &Path, schema: &TableSchema) -> Result<Vec<Row>, LoadError> {
        let buffer = match fs::read(path).await {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::SourceNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(LoadError::Write {
                    table: schema.table_name.clone(),
                    reason: format!("failed to read source file {}: {}", path.display(), e),
                });
            }
        };

        self.parse(&buffer, schema)
    }

    /// Parse raw delimited bytes into conformed rows.
    pub fn parse(&self, buffer: &[u8], schema: &TableSchema) -> Result<Vec<Row>, LoadError> {
        let table = &schema.table_name;

        // TPC-H fields are never quoted; comment text may contain quote
        // characters, so quoting must be off.
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(buffer);

        let expected = schema.column_count();
        let mut rows = Vec::new();

        for (idx, result) in csv_reader.records().enumerate() {
            let line = idx as u64 + 1;
            let record = result
                .map_err(|e| LoadError::schema_mismatch(table, line, format!("malformed record: {e}")))?;

            let mut field_count = record.len();
            if field_count == expected + 1 && record.get(expected) == Some("") {
                // dbgen's trailing end-of-line separator
                field_count = expected;
            }
            if field_count != expected {
                return Err(LoadError::schema_mismatch(
                    table,
                    line,
                    format!("expected {expected} fields, found {}", record.len()),
                ));
            }

            let mut values = Vec::with_capacity(expected);
            for (col, field) in schema.columns.iter().zip(record.iter()) {
                values.push(coerce_value(table, line, col, field)?);
            }
            rows.push(Row { values });
        }

        Ok(rows)
    }
}

/// Coerce one raw field to its column's declared type.
fn coerce_value(
    table: &str,
    line: u64,
    col: &ColumnDefinition,
    field: &str,
) -> Result<Value, LoadError> {
    if field.is_empty() {
        if col.nullable {
            return Ok(Value::Null);
        }
        return Err(LoadError::schema_mismatch(
            table,
            line,
            format!("null value in non-nullable column '{}'", col.name),
        ));
    }

    let mismatch = |got: &str| {
        LoadError::schema_mismatch(
            table,
            line,
            format!(
                "cannot convert '{}' to {} for column '{}'",
                got,
                col.column_type.name(),
                col.name
            ),
        )
    };

    match col.column_type {
        ColumnType::Integer => field
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| mismatch(field)),
        ColumnType::Float => field
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| mismatch(field)),
        ColumnType::Date => NaiveDate::parse_from_str(field, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| mismatch(field)),
        ColumnType::String => Ok(Value::Text(field.to_string())),
    }
}
