use serde::{Deserialize, Serialize};

/// Semantic type of a source column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Date,
}

impl ColumnType {
    /// Human-readable type name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::String => "STRING",
            ColumnType::Date => "DATE",
        }
    }
}

/// A column in a table schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnDefinition {
    pub fn new(name: &str, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            nullable,
        }
    }
}

/// Ordered column definitions for one destination table.
///
/// Immutable once constructed; column order matches the field order
/// of the corresponding source file exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    /// Build a schema, asserting that column names are unique.
    ///
    /// Panics on a duplicate name. Schemas are static configuration created
    /// at process start, so a duplicate is a programming error, not input.
    pub fn new(table_name: &str, columns: Vec<ColumnDefinition>) -> Self {
        for (i, col) in columns.iter().enumerate() {
            assert!(
                !columns[..i].iter().any(|c| c.name == col.name),
                "duplicate column '{}' in table '{}'",
                col.name,
                table_name
            );
        }
        Self {
            table_name: table_name.to_string(),
            columns,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
