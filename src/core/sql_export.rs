//! SQL export: `CREATE TABLE` plus one `INSERT INTO` per stored row.
//!
//! Output depends only on the snapshot, so the same schema always yields the
//! same text.

use super::constraints::parse_boolean;
use super::schema::{ColumnType, Schema, Table};

/// Generates the DDL+DML script for every table, in creation order.
///
/// Tables are separated by a blank line. An empty schema gives an empty string.
pub fn generate_sql(schema: &Schema) -> String {
    schema
        .tables()
        .iter()
        .map(|table| table_sql(schema, table))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn table_sql(schema: &Schema, table: &Table) -> String {
    let columns = table
        .columns
        .iter()
        .map(|c| {
            let pk = if table.is_primary_key(&c.name) {
                " PRIMARY KEY"
            } else {
                ""
            };
            format!("  {} {}{}", c.name, c.column_type, pk)
        })
        .collect::<Vec<_>>()
        .join(",\n");

    let foreign_keys = table
        .foreign_keys
        .iter()
        .map(|fk| {
            // Dangling references fall back to the raw id.
            let parent = schema
                .table_name(&fk.ref_table)
                .unwrap_or(fk.ref_table.as_str());
            format!(
                "  FOREIGN KEY ({}) REFERENCES {}({})",
                fk.column, parent, fk.ref_column
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    let constraints = if foreign_keys.is_empty() {
        String::new()
    } else {
        format!(",\n{}", foreign_keys)
    };

    format!(
        "CREATE TABLE {} (\n{}{}\n);\n{}",
        table.name,
        columns,
        constraints,
        insert_statements(table).join("\n")
    )
}

fn insert_statements(table: &Table) -> Vec<String> {
    let column_names = table
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    (0..table.max_row_count())
        .map(|row| {
            let values = table
                .columns
                .iter()
                .enumerate()
                .map(|(index, column)| sql_literal(column.column_type, table.cell(row, index)))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({});",
                table.name, column_names, values
            )
        })
        .collect()
}

/// Renders one stored cell as an SQL literal. Missing and empty cells are `NULL`.
///
/// Numeric cells are emitted verbatim; they were checked when written.
pub fn sql_literal(column_type: ColumnType, cell: Option<&str>) -> String {
    let value = match cell {
        None | Some("") => return "NULL".to_string(),
        Some(value) => value,
    };

    match column_type {
        ColumnType::Integer | ColumnType::Real => value.to_string(),
        ColumnType::Boolean => match parse_boolean(value) {
            Some(true) => "TRUE".to_string(),
            Some(false) => "FALSE".to_string(),
            None => "NULL".to_string(),
        },
        ColumnType::Text => format!("'{}'", value.replace('\'', "''")),
    }
}
