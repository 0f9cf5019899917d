//! Mutation API: every operation takes a snapshot by reference and returns
//! the next snapshot, or an error with the original left as it was.

use serde::{Deserialize, Serialize};

use super::constraints::{check_cell, check_primary_key, normalize};
use super::error::SchemaError;
use super::schema::{Column, ColumnType, ForeignKey, Schema, Table, TableId};

/// A single edit coming from the editor, serializable for the UI bridge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    CreateTable {
        name: String,
        columns: Vec<Column>,
        #[serde(default)]
        primary_key: String,
    },
    AddColumn {
        table: TableId,
        name: String,
        #[serde(rename = "type", default)]
        column_type: ColumnType,
    },
    RenameTable {
        table: TableId,
        name: String,
    },
    RenameColumn {
        table: TableId,
        index: usize,
        name: String,
    },
    ChangeColumnType {
        table: TableId,
        index: usize,
        #[serde(rename = "type")]
        column_type: ColumnType,
    },
    RemoveColumn {
        table: TableId,
        index: usize,
    },
    /// Empty `column` clears the key
    SetPrimaryKey {
        table: TableId,
        #[serde(default)]
        column: String,
    },
    AddForeignKey {
        child: TableId,
        child_column: String,
        parent: TableId,
        parent_column: String,
    },
    MoveTable {
        table: TableId,
        position: (f64, f64),
    },
    AddRow {
        table: TableId,
        values: Vec<Option<String>>,
    },
    UpdateCell {
        table: TableId,
        row: usize,
        column: usize,
        value: String,
    },
    RemoveRow {
        table: TableId,
        row: usize,
    },
}

impl Mutation {
    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::CreateTable { .. } => "create_table",
            Mutation::AddColumn { .. } => "add_column",
            Mutation::RenameTable { .. } => "rename_table",
            Mutation::RenameColumn { .. } => "rename_column",
            Mutation::ChangeColumnType { .. } => "change_column_type",
            Mutation::RemoveColumn { .. } => "remove_column",
            Mutation::SetPrimaryKey { .. } => "set_primary_key",
            Mutation::AddForeignKey { .. } => "add_foreign_key",
            Mutation::MoveTable { .. } => "move_table",
            Mutation::AddRow { .. } => "add_row",
            Mutation::UpdateCell { .. } => "update_cell",
            Mutation::RemoveRow { .. } => "remove_row",
        }
    }
}

impl Schema {
    /// Applies one mutation and returns the resulting snapshot.
    pub fn apply(&self, mutation: &Mutation) -> Result<Schema, SchemaError> {
        match mutation {
            Mutation::CreateTable {
                name,
                columns,
                primary_key,
            } => self
                .create_table(name, columns.clone(), primary_key)
                .map(|(schema, _)| schema),
            Mutation::AddColumn {
                table,
                name,
                column_type,
            } => self.add_column(table, name, *column_type),
            Mutation::RenameTable { table, name } => self.rename_table(table, name),
            Mutation::RenameColumn { table, index, name } => {
                self.rename_column(table, *index, name)
            }
            Mutation::ChangeColumnType {
                table,
                index,
                column_type,
            } => self.change_column_type(table, *index, *column_type),
            Mutation::RemoveColumn { table, index } => self.remove_column(table, *index),
            Mutation::SetPrimaryKey { table, column } => self.set_primary_key(table, column),
            Mutation::AddForeignKey {
                child,
                child_column,
                parent,
                parent_column,
            } => self.add_foreign_key(child, child_column, parent, parent_column),
            Mutation::MoveTable { table, position } => {
                self.move_table(table, position.0, position.1)
            }
            Mutation::AddRow { table, values } => {
                let values: Vec<&str> = values
                    .iter()
                    .map(|v| v.as_deref().unwrap_or_default())
                    .collect();
                self.add_row(table, &values)
            }
            Mutation::UpdateCell {
                table,
                row,
                column,
                value,
            } => self.update_cell(table, *row, *column, value),
            Mutation::RemoveRow { table, row } => self.remove_row(table, *row),
        }
    }

    /// Copy-on-write helper: clones the snapshot, edits one table, and only
    /// hands the copy back if the edit succeeded.
    ///
    /// Ragged storage (e.g. from deserialized input) is padded before the
    /// edit runs, so every edit sees one full-length sequence per column.
    fn edit_table<F>(&self, id: &TableId, edit: F) -> Result<Schema, SchemaError>
    where
        F: FnOnce(&mut Table) -> Result<(), SchemaError>,
    {
        let mut next = self.clone();
        let table = next.table_mut(id)?;
        table.repair_storage();
        edit(table)?;
        Ok(next)
    }

    /// Creates a table from the given columns, dropping blank-named ones.
    ///
    /// A blank `name` becomes `<prefix><n>`. The primary key is kept only if
    /// it names one of the remaining columns.
    pub fn create_table(
        &self,
        name: &str,
        columns: Vec<Column>,
        primary_key: &str,
    ) -> Result<(Schema, TableId), SchemaError> {
        let columns: Vec<Column> = columns
            .into_iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|c| Column::new(c.name.trim(), c.column_type))
            .collect();
        if columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }

        let ordinal = self.len();
        let id = self.next_table_id();
        let name = match name.trim() {
            "" => format!("{}{}", self.placement().name_prefix, ordinal + 1),
            trimmed => trimmed.to_string(),
        };

        let primary_key = primary_key.trim();
        let mut table = Table::new(id.clone(), name, columns);
        if table.column_index(primary_key).is_some() {
            table.primary_key = Some(primary_key.to_string());
        }
        table.position = self.placement().position_for(ordinal);

        let mut next = self.clone();
        next.tables_mut().push(table);
        Ok((next, id))
    }

    /// Appends a column with an empty cell for every existing row.
    pub fn add_column(
        &self,
        id: &TableId,
        name: &str,
        column_type: ColumnType,
    ) -> Result<Schema, SchemaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::BlankColumnName);
        }

        self.edit_table(id, |table| {
            let rows = table.row_count();
            table.columns.push(Column::new(name, column_type));
            table.values.push(vec![String::new(); rows]);
            Ok(())
        })
    }

    pub fn rename_table(&self, id: &TableId, name: &str) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            table.name = name.to_string();
            Ok(())
        })
    }

    /// Renames a column. A primary key naming it follows the rename; foreign
    /// keys that mention the old name are left as they are.
    pub fn rename_column(
        &self,
        id: &TableId,
        index: usize,
        name: &str,
    ) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            let len = table.columns.len();
            let column = table
                .columns
                .get_mut(index)
                .ok_or(SchemaError::ColumnOutOfRange { index, len })?;
            let old = std::mem::replace(&mut column.name, name.to_string());
            if table.primary_key.as_deref() == Some(old.as_str()) {
                table.primary_key = Some(name.to_string());
            }
            Ok(())
        })
    }

    /// Changes the declared type. Stored values are not re-checked.
    pub fn change_column_type(
        &self,
        id: &TableId,
        index: usize,
        column_type: ColumnType,
    ) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            let len = table.columns.len();
            let column = table
                .columns
                .get_mut(index)
                .ok_or(SchemaError::ColumnOutOfRange { index, len })?;
            column.column_type = column_type;
            Ok(())
        })
    }

    /// Removes a column together with its cells; clears the primary key if
    /// it was that column.
    pub fn remove_column(&self, id: &TableId, index: usize) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            let len = table.columns.len();
            if index >= len {
                return Err(SchemaError::ColumnOutOfRange { index, len });
            }
            if table.primary_key_index() == Some(index) {
                table.primary_key = None;
            }
            table.columns.remove(index);
            table.values.remove(index);
            Ok(())
        })
    }

    /// Sets the primary key, or clears it when `column` is empty.
    ///
    /// Rows stored before the key was set are not checked for uniqueness.
    pub fn set_primary_key(&self, id: &TableId, column: &str) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            if column.is_empty() {
                table.primary_key = None;
                return Ok(());
            }
            if table.column_index(column).is_none() {
                return Err(SchemaError::UnknownColumn(column.to_string()));
            }
            table.primary_key = Some(column.to_string());
            Ok(())
        })
    }

    /// Records `child.child_column -> parent.parent_column` on the child.
    ///
    /// Only the child table has to exist; nothing else is checked and
    /// duplicates are kept.
    pub fn add_foreign_key(
        &self,
        child: &TableId,
        child_column: &str,
        parent: &TableId,
        parent_column: &str,
    ) -> Result<Schema, SchemaError> {
        self.edit_table(child, |table| {
            table.foreign_keys.push(ForeignKey::new(
                child_column,
                parent.clone(),
                parent_column,
            ));
            Ok(())
        })
    }

    pub fn move_table(&self, id: &TableId, x: f64, y: f64) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            table.position = (x, y);
            Ok(())
        })
    }

    /// Appends a row. Values are trimmed; positions past the end of `values`
    /// are empty and extra values are dropped.
    ///
    /// Without a primary key an all-blank row is ignored and the snapshot is
    /// returned unchanged.
    pub fn add_row<S: AsRef<str>>(&self, id: &TableId, values: &[S]) -> Result<Schema, SchemaError> {
        let table = self
            .table(id)
            .ok_or_else(|| SchemaError::TableNotFound(id.clone()))?;
        let row: Vec<String> = (0..table.columns.len())
            .map(|i| normalize(values.get(i).map(AsRef::as_ref)))
            .collect();

        if table.primary_key_index().is_none() && row.iter().all(String::is_empty) {
            return Ok(self.clone());
        }
        check_primary_key(table, &row)?;

        self.edit_table(id, |table| {
            for (column, value) in table.values.iter_mut().zip(row) {
                column.push(value);
            }
            Ok(())
        })
    }

    /// Overwrites one cell after checking it against the column type.
    pub fn update_cell(
        &self,
        id: &TableId,
        row: usize,
        column: usize,
        raw: &str,
    ) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            let rows = table.row_count();
            if row >= rows {
                return Err(SchemaError::RowOutOfRange { index: row, len: rows });
            }
            let len = table.columns.len();
            let definition = table
                .columns
                .get(column)
                .ok_or(SchemaError::ColumnOutOfRange { index: column, len })?;
            let value = check_cell(definition, raw)?;

            table.values[column][row] = value;
            Ok(())
        })
    }

    /// Deletes row `row` from every column.
    pub fn remove_row(&self, id: &TableId, row: usize) -> Result<Schema, SchemaError> {
        self.edit_table(id, |table| {
            let rows = table.row_count();
            if row >= rows {
                return Err(SchemaError::RowOutOfRange { index: row, len: rows });
            }
            for column in table.values.iter_mut() {
                column.remove(row);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> (Schema, TableId) {
        Schema::new()
            .create_table(
                "users",
                vec![Column::new("id", ColumnType::Integer), Column::text("name")],
                "id",
            )
            .unwrap()
    }

    #[test]
    fn test_create_table_drops_blank_columns() {
        let (schema, id) = Schema::new()
            .create_table(
                " people ",
                vec![Column::text(" name "), Column::text("   "), Column::text("")],
                "",
            )
            .unwrap();

        let table = schema.table(&id).unwrap();
        assert_eq!(table.name, "people");
        assert_eq!(table.columns, vec![Column::text("name")]);
        assert_eq!(table.values.len(), 1);
        assert_eq!(table.primary_key, None);
    }

    #[test]
    fn test_create_table_without_columns() {
        let result = Schema::new().create_table("t", vec![Column::text(" ")], "");
        assert_eq!(result.unwrap_err(), SchemaError::NoColumns);
    }

    #[test]
    fn test_create_table_defaults() {
        let (schema, first) = Schema::new()
            .create_table("", vec![Column::text("a")], "")
            .unwrap();
        let (schema, second) = schema.create_table("", vec![Column::text("a")], "").unwrap();

        assert_eq!(first.as_str(), "1");
        assert_eq!(second.as_str(), "2");
        assert_eq!(schema.table_name(&first), Some("Table1"));
        assert_eq!(schema.table_name(&second), Some("Table2"));
        assert_eq!(schema.table(&first).unwrap().position, (100.0, 100.0));
        assert_eq!(schema.table(&second).unwrap().position, (120.0, 120.0));
    }

    #[test]
    fn test_create_table_ignores_unknown_primary_key() {
        let (schema, id) = Schema::new()
            .create_table("t", vec![Column::text("a")], "missing")
            .unwrap();
        assert_eq!(schema.table(&id).unwrap().primary_key, None);
    }

    #[test]
    fn test_add_column_pads_existing_rows() {
        let (schema, id) = users();
        let schema = schema
            .add_row(&id, &["1", "Alice"])
            .unwrap()
            .add_row(&id, &["2", "Bob"])
            .unwrap()
            .add_column(&id, "email", ColumnType::Text)
            .unwrap();

        let table = schema.table(&id).unwrap();
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.values[2], vec!["".to_string(), "".to_string()]);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_add_blank_column() {
        let (schema, id) = users();
        assert_eq!(
            schema.add_column(&id, "  ", ColumnType::Text).unwrap_err(),
            SchemaError::BlankColumnName
        );
    }

    #[test]
    fn test_rename_column_carries_primary_key() {
        let (schema, id) = users();
        let schema = schema.rename_column(&id, 0, "user_id").unwrap();
        let table = schema.table(&id).unwrap();
        assert_eq!(table.primary_key.as_deref(), Some("user_id"));

        let result = schema.rename_column(&id, 5, "x");
        assert_eq!(
            result.unwrap_err(),
            SchemaError::ColumnOutOfRange { index: 5, len: 2 }
        );
    }

    #[test]
    fn test_change_type_keeps_values() {
        let (schema, id) = users();
        let schema = schema
            .add_row(&id, &["1", "Alice"])
            .unwrap()
            .change_column_type(&id, 1, ColumnType::Integer)
            .unwrap();

        let table = schema.table(&id).unwrap();
        assert_eq!(table.columns[1].column_type, ColumnType::Integer);
        assert_eq!(table.cell(0, 1), Some("Alice"));
    }

    #[test]
    fn test_remove_primary_key_column() {
        let (schema, id) = users();
        let schema = schema
            .add_row(&id, &["1", "Alice"])
            .unwrap()
            .remove_column(&id, 0)
            .unwrap();

        let table = schema.table(&id).unwrap();
        assert_eq!(table.primary_key, None);
        assert_eq!(table.columns, vec![Column::text("name")]);
        assert_eq!(table.values, vec![vec!["Alice".to_string()]]);
    }

    #[test]
    fn test_set_primary_key() {
        let (schema, id) = users();
        let schema = schema.set_primary_key(&id, "name").unwrap();
        assert_eq!(schema.table(&id).unwrap().primary_key.as_deref(), Some("name"));

        let schema = schema.set_primary_key(&id, "").unwrap();
        assert_eq!(schema.table(&id).unwrap().primary_key, None);

        assert_eq!(
            schema.set_primary_key(&id, "nope").unwrap_err(),
            SchemaError::UnknownColumn("nope".into())
        );
    }

    #[test]
    fn test_set_primary_key_over_duplicates() {
        let (schema, id) = users();
        let schema = schema
            .set_primary_key(&id, "")
            .unwrap()
            .add_row(&id, &["1", "Same"])
            .unwrap()
            .add_row(&id, &["2", "Same"])
            .unwrap();

        // Existing duplicates are accepted, later inserts are checked.
        let schema = schema.set_primary_key(&id, "name").unwrap();
        assert!(matches!(
            schema.add_row(&id, &["3", "Same"]),
            Err(SchemaError::DuplicatePrimaryKey { .. })
        ));
    }

    #[test]
    fn test_add_foreign_key_is_unchecked() {
        let (schema, id) = users();
        let ghost = TableId::new("99");
        let schema = schema
            .add_foreign_key(&id, "name", &ghost, "whatever")
            .unwrap()
            .add_foreign_key(&id, "name", &ghost, "whatever")
            .unwrap();

        assert_eq!(schema.table(&id).unwrap().foreign_keys.len(), 2);

        let result = schema.add_foreign_key(&ghost, "a", &id, "id");
        assert_eq!(result.unwrap_err(), SchemaError::TableNotFound(ghost));
    }

    #[test]
    fn test_add_row_trims_and_pads() {
        let (schema, id) = users();
        let schema = schema.add_row(&id, &[" 7 "]).unwrap();
        let table = schema.table(&id).unwrap();
        assert_eq!(table.row(0), vec![Some("7"), Some("")]);

        let schema = schema.add_row(&id, &["8", "x", "extra"]).unwrap();
        assert_eq!(schema.table(&id).unwrap().row_count(), 2);
    }

    #[test]
    fn test_add_blank_row_without_key_is_noop() {
        let (schema, id) = Schema::new()
            .create_table("notes", vec![Column::text("body")], "")
            .unwrap();
        let next = schema.add_row(&id, &["   "]).unwrap();
        assert_eq!(next, schema);
        assert_eq!(next.table(&id).unwrap().row_count(), 0);
    }

    #[test]
    fn test_add_row_primary_key_errors_leave_schema() {
        let (schema, id) = users();
        let schema = schema.add_row(&id, &["1", "Alice"]).unwrap();

        let before = schema.clone();
        assert!(matches!(
            schema.add_row(&id, &[" 1 ", "Bob"]),
            Err(SchemaError::DuplicatePrimaryKey { .. })
        ));
        assert!(matches!(
            schema.add_row(&id, &["", "Bob"]),
            Err(SchemaError::EmptyPrimaryKey { .. })
        ));
        assert_eq!(schema, before);
    }

    #[test]
    fn test_update_cell() {
        let (schema, id) = users();
        let schema = schema.add_row(&id, &["1", "Alice"]).unwrap();

        let schema = schema.update_cell(&id, 0, 1, "Alicia").unwrap();
        assert_eq!(schema.table(&id).unwrap().cell(0, 1), Some("Alicia"));

        let result = schema.update_cell(&id, 0, 0, "one");
        assert!(matches!(result, Err(ref e) if e.is_silent()));
        assert_eq!(schema.table(&id).unwrap().cell(0, 0), Some("1"));

        let schema = schema.update_cell(&id, 0, 0, "").unwrap();
        assert_eq!(schema.table(&id).unwrap().cell(0, 0), Some(""));
    }

    #[test]
    fn test_update_cell_out_of_range() {
        let (schema, id) = users();
        let schema = schema.add_row(&id, &["1", "Alice"]).unwrap();

        assert_eq!(
            schema.update_cell(&id, 3, 0, "2").unwrap_err(),
            SchemaError::RowOutOfRange { index: 3, len: 1 }
        );
        assert_eq!(
            schema.update_cell(&id, 0, 9, "2").unwrap_err(),
            SchemaError::ColumnOutOfRange { index: 9, len: 2 }
        );
        assert!(schema.table(&id).unwrap().is_consistent());
    }

    #[test]
    fn test_remove_row() {
        let (schema, id) = users();
        let schema = schema
            .add_row(&id, &["1", "Alice"])
            .unwrap()
            .add_row(&id, &["2", "Bob"])
            .unwrap()
            .remove_row(&id, 0)
            .unwrap();

        let table = schema.table(&id).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.row(0), vec![Some("2"), Some("Bob")]);
        assert!(schema.remove_row(&id, 1).is_err());
    }

    #[test]
    fn test_apply_mutation_from_json() {
        let (schema, id) = users();
        let mutation: Mutation = serde_json::from_value(serde_json::json!({
            "op": "add_row",
            "table": "1",
            "values": ["5", null]
        }))
        .unwrap();

        assert_eq!(mutation.name(), "add_row");
        let schema = schema.apply(&mutation).unwrap();
        assert_eq!(schema.table(&id).unwrap().row(0), vec![Some("5"), Some("")]);
    }

    #[test]
    fn test_move_table() {
        let (schema, id) = users();
        let schema = schema
            .apply(&Mutation::MoveTable {
                table: id.clone(),
                position: (10.0, -4.5),
            })
            .unwrap();
        assert_eq!(schema.table(&id).unwrap().position, (10.0, -4.5));
    }

    fn ragged() -> (Schema, TableId) {
        let (mut schema, id) = Schema::new()
            .create_table("t", vec![Column::text("a"), Column::text("b")], "")
            .unwrap();
        schema.table_mut(&id).unwrap().values =
            vec![vec!["x".into(), "y".into()], vec!["1".into()]];
        (schema, id)
    }

    #[test]
    fn test_update_cell_on_ragged_storage() {
        let (schema, id) = ragged();
        let schema = schema.update_cell(&id, 1, 1, "z").unwrap();

        let table = schema.table(&id).unwrap();
        assert_eq!(table.cell(1, 1), Some("z"));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_mutations_repair_ragged_storage() {
        let (schema, id) = ragged();

        let with_column = schema.add_column(&id, "c", ColumnType::Text).unwrap();
        let table = with_column.table(&id).unwrap();
        assert!(table.is_consistent());
        assert_eq!(table.row(1), vec![Some("y"), Some(""), Some("")]);

        let with_row = schema.add_row(&id, &["z", "3"]).unwrap();
        let table = with_row.table(&id).unwrap();
        assert!(table.is_consistent());
        assert_eq!(table.row(2), vec![Some("z"), Some("3")]);

        let mut missing = schema.clone();
        missing.table_mut(&id).unwrap().values = vec![vec!["x".into()]];
        let with_row = missing.add_row(&id, &["p", "q"]).unwrap();
        let table = with_row.table(&id).unwrap();
        assert!(table.is_consistent());
        assert_eq!(table.row(1), vec![Some("p"), Some("q")]);
    }

    #[test]
    fn test_remove_duplicate_named_column_keeps_key() {
        let (schema, id) = Schema::new()
            .create_table("t", vec![Column::text("code"), Column::text("code")], "code")
            .unwrap();
        let schema = schema.remove_column(&id, 1).unwrap();

        let table = schema.table(&id).unwrap();
        assert_eq!(table.primary_key.as_deref(), Some("code"));
        assert_eq!(table.columns.len(), 1);

        let schema = schema.remove_column(&id, 0).unwrap();
        assert_eq!(schema.table(&id).unwrap().primary_key, None);
    }
}
