//! Mermaid `erDiagram` export

use super::schema::{Schema, Table, TableId};

pub const ERD_HEADER: &str = "erDiagram";

/// Output for a schema without tables
pub const EMPTY_DIAGRAM: &str = "erDiagram\n  No tables found";

/// Relationship token. Cardinality is not inferred from data.
const ONE_TO_ONE: &str = "||--||";

/// Drops every character outside `[A-Za-z0-9_]`.
///
/// Pure and idempotent: `sanitize(&sanitize(s)) == sanitize(s)`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Entity name for a table; a name that sanitizes to nothing falls back to the id.
fn entity_name(table: &Table) -> String {
    let name = sanitize(&table.name);
    if name.is_empty() {
        sanitize(table.id.as_str())
    } else {
        name
    }
}

fn parent_name(schema: &Schema, id: &TableId) -> String {
    match schema.table(id) {
        Some(parent) => entity_name(parent),
        None => sanitize(id.as_str()),
    }
}

/// Generates the diagram text: entity blocks first, then one relationship
/// line per foreign key.
pub fn generate_erd(schema: &Schema) -> String {
    if schema.is_empty() {
        return EMPTY_DIAGRAM.to_string();
    }

    let mut lines = vec![ERD_HEADER.to_string()];

    for table in schema.tables() {
        let name = entity_name(table);
        lines.push(format!("{} {{", name));
        if table.columns.is_empty() {
            lines.push("  empty".to_string());
        }
        for column in &table.columns {
            let pk = if table.is_primary_key(&column.name) {
                " PK"
            } else {
                ""
            };
            lines.push(format!(
                "  {} {}{}",
                column.column_type,
                sanitize(&column.name),
                pk
            ));
        }
        lines.push("}".to_string());
    }

    for child in schema.tables() {
        for fk in &child.foreign_keys {
            let label = if fk.column == fk.ref_column {
                fk.column.clone()
            } else {
                format!("{} to {}", fk.column, fk.ref_column)
            };
            lines.push(format!(
                "{} {} {} : \"{}\"",
                parent_name(schema, &fk.ref_table),
                ONE_TO_ONE,
                entity_name(child),
                label
            ));
        }
    }

    lines.join("\n")
}
