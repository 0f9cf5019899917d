//! Error types for schema mutations

use super::schema::{ColumnType, TableId};

/// Reasons a mutation can be rejected.
///
/// A rejected mutation never touches the snapshot it was applied to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Please add at least one column")]
    NoColumns,

    #[error("Primary key '{column}' cannot be empty")]
    EmptyPrimaryKey { column: String },

    #[error("Duplicate primary key value '{value}' in column '{column}'")]
    DuplicatePrimaryKey { column: String, value: String },

    #[error("Value '{value}' is not a valid {column_type} for column '{column}'")]
    InvalidCellType {
        column: String,
        column_type: ColumnType,
        value: String,
    },

    #[error("Table '{0}' not found")]
    TableNotFound(TableId),

    #[error("Column index {index} out of range (table has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("Row index {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("Column name cannot be empty")]
    BlankColumnName,

    #[error("Unknown column type '{0}'")]
    UnknownColumnType(String),
}

impl SchemaError {
    /// Rejections the editor swallows while the user is still typing.
    pub fn is_silent(&self) -> bool {
        matches!(self, SchemaError::InvalidCellType { .. })
    }
}
