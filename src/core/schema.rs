use std::str::FromStr;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use super::config::Config;
use super::error::SchemaError;

/// Stable identifier of a table. Survives renames.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, From)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TableId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Declared type of a column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    #[default]
    #[display("TEXT")]
    Text,
    #[display("INTEGER")]
    Integer,
    #[display("REAL")]
    Real,
    #[display("BOOLEAN")]
    Boolean,
}

impl ColumnType {
    pub const ALL: [ColumnType; 4] = [
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Real,
        ColumnType::Boolean,
    ];

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Real)
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ColumnType::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SchemaError::UnknownColumnType(trimmed.to_string()))
    }
}

/// Table column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }
}

/// Foreign key stored on the referencing (child) table.
///
/// Neither endpoint is checked when the key is created, so `ref_table` and
/// `ref_column` may stop resolving after later edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub ref_table: TableId,
    pub ref_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        ref_table: impl Into<TableId>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        }
    }
}

/// A table on the canvas.
///
/// Cells are stored column-major: `values[c][r]` is row `r` of column `c`.
/// Mutations keep `values.len() == columns.len()` and every column sequence
/// at the same length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Canvas position (x, y)
    #[serde(default)]
    pub position: (f64, f64),
}

impl Table {
    pub(crate) fn new(id: TableId, name: impl Into<String>, columns: Vec<Column>) -> Self {
        let values = vec![Vec::new(); columns.len()];
        Self {
            id,
            name: name.into(),
            columns,
            primary_key: None,
            values,
            foreign_keys: Vec::new(),
            position: (0.0, 0.0),
        }
    }

    /// Number of rows, read from the first column's sequence.
    pub fn row_count(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// Longest column sequence. Equals `row_count` unless the storage is ragged.
    pub fn max_row_count(&self) -> usize {
        self.values.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get_column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Index of the primary key column, if the key names an existing column.
    pub fn primary_key_index(&self) -> Option<usize> {
        self.primary_key
            .as_deref()
            .and_then(|pk| self.column_index(pk))
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.as_deref() == Some(column)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.values.get(column)?.get(row).map(String::as_str)
    }

    /// Row `index` across all columns, missing cells as `None`.
    pub fn row(&self, index: usize) -> Vec<Option<&str>> {
        (0..self.columns.len())
            .map(|c| self.cell(index, c))
            .collect()
    }

    /// Checks the storage invariants: one sequence per column, all equal length.
    pub fn is_consistent(&self) -> bool {
        let rows = self.row_count();
        self.values.len() == self.columns.len() && self.values.iter().all(|v| v.len() == rows)
    }

    /// Restores the storage invariants on ragged input: one sequence per
    /// column, each padded with empty cells to the longest one.
    pub(crate) fn repair_storage(&mut self) {
        let rows = self.max_row_count();
        self.values.resize_with(self.columns.len(), Vec::new);
        for column in &mut self.values {
            column.resize(rows, String::new());
        }
    }
}

/// Where new tables land on the canvas and what blank-named tables are called.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub name_prefix: String,
    pub origin: (f64, f64),
    pub step: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Placement {
    fn from(config: &Config) -> Self {
        Self {
            name_prefix: config.table_prefix.clone(),
            origin: config.canvas_origin,
            step: config.canvas_step,
        }
    }
}

impl Placement {
    pub(crate) fn position_for(&self, ordinal: usize) -> (f64, f64) {
        let offset = ordinal as f64 * self.step;
        (self.origin.0 + offset, self.origin.1 + offset)
    }
}

/// Immutable snapshot of the whole schema.
///
/// Every mutation returns a fresh snapshot and leaves `self` untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    tables: Vec<Table>,
    #[serde(skip)]
    placement: Placement,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            tables: Vec::new(),
            placement: Placement::from(config),
        }
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Tables in creation order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, id: &TableId) -> Option<&Table> {
        self.tables.iter().find(|t| &t.id == id)
    }

    pub fn find_table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_name(&self, id: &TableId) -> Option<&str> {
        self.table(id).map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Same tables, ignoring placement settings
    pub fn same_tables(&self, other: &Schema) -> bool {
        self.tables == other.tables
    }

    pub(crate) fn tables_mut(&mut self) -> &mut Vec<Table> {
        &mut self.tables
    }

    pub(crate) fn table_mut(&mut self, id: &TableId) -> Result<&mut Table, SchemaError> {
        self.tables
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| SchemaError::TableNotFound(id.clone()))
    }

    /// Next free sequential id: table count + 1, bumped past any taken id.
    pub(crate) fn next_table_id(&self) -> TableId {
        let mut n = self.tables.len() + 1;
        loop {
            let candidate = TableId(n.to_string());
            if self.table(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Small demo schema: users and orders linked by orders.user_id -> users.id
pub fn create_demo_schema() -> Result<Schema, SchemaError> {
    let schema = Schema::new();

    let (schema, users) = schema.create_table(
        "users",
        vec![
            Column::new("id", ColumnType::Integer),
            Column::text("name"),
            Column::new("active", ColumnType::Boolean),
        ],
        "id",
    )?;
    let (schema, orders) = schema.create_table(
        "orders",
        vec![
            Column::new("id", ColumnType::Integer),
            Column::new("user_id", ColumnType::Integer),
            Column::new("total", ColumnType::Real),
        ],
        "id",
    )?;

    schema
        .add_row(&users, &["1", "Alice", "yes"])?
        .add_row(&users, &["2", "Bob", "no"])?
        .add_row(&orders, &["10", "1", "19.99"])?
        .add_foreign_key(&orders, "user_id", &users, "id")
}
