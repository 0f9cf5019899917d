//! Read-only health report for a schema.
//!
//! Mutations tolerate dangling references and accept any name, so a schema
//! can drift into a state the exports only render approximately. `diagnose`
//! lists those spots. It never changes the schema.

use std::collections::HashSet;

use super::constraints::normalize;
use super::schema::{Schema, Table, TableId};
use super::validation::{IdentifierIssue, check_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Exported SQL will not load as-is
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum DiagnosticKind {
    #[display("Foreign key column '{column}' does not exist")]
    UnknownChildColumn { column: String },

    #[display("Foreign key on '{column}' references missing table '{ref_table}'")]
    UnknownReferencedTable { column: String, ref_table: TableId },

    #[display("Foreign key on '{column}' references missing column '{ref_table}.{ref_column}'")]
    UnknownReferencedColumn {
        column: String,
        ref_table: TableId,
        ref_column: String,
    },

    #[display("Primary key '{column}' does not exist")]
    UnknownPrimaryKey { column: String },

    #[display("Primary key '{column}' is empty in row {row}")]
    EmptyPrimaryKeyValue { column: String, row: usize },

    #[display("Primary key '{column}' has duplicate value '{value}'")]
    DuplicatePrimaryKeyValue { column: String, value: String },

    #[display("Column name '{column}' is used more than once")]
    DuplicateColumnName { column: String },

    #[display("Table name: {issue}")]
    TableName { issue: IdentifierIssue },

    #[display("Column '{column}': {issue}")]
    ColumnName {
        column: String,
        issue: IdentifierIssue,
    },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::UnknownPrimaryKey { .. }
            | DiagnosticKind::EmptyPrimaryKeyValue { .. }
            | DiagnosticKind::DuplicatePrimaryKeyValue { .. }
            | DiagnosticKind::DuplicateColumnName { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// One finding, attached to the table it was found in
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub table: TableId,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Findings split by severity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Findings for a single table, errors first
    pub fn for_table<'a>(&'a self, id: &'a TableId) -> impl Iterator<Item = &'a Diagnostic> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |d| &d.table == id)
    }

    /// Get all messages (errors and warnings) as strings
    pub fn all_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|d| format!("Error: {}", d.kind))
            .chain(self.warnings.iter().map(|d| format!("Warning: {}", d.kind)))
            .collect()
    }

    fn push(&mut self, table: &TableId, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            table: table.clone(),
            kind,
        };
        match diagnostic.severity() {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }
}

/// Inspects every table in `schema`.
pub fn diagnose(schema: &Schema) -> DiagnosticReport {
    let mut report = DiagnosticReport::default();

    for table in schema.tables() {
        check_names(table, &mut report);
        check_primary_key(table, &mut report);
        check_foreign_keys(schema, table, &mut report);
    }

    if !report.is_empty() {
        tracing::debug!(
            "Schema diagnostics: {} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
    }
    report
}

fn check_names(table: &Table, report: &mut DiagnosticReport) {
    for issue in check_identifier(&table.name) {
        report.push(&table.id, DiagnosticKind::TableName { issue });
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for column in &table.columns {
        for issue in check_identifier(&column.name) {
            report.push(
                &table.id,
                DiagnosticKind::ColumnName {
                    column: column.name.clone(),
                    issue,
                },
            );
        }
        if !seen.insert(column.name.as_str()) && reported.insert(column.name.as_str()) {
            report.push(
                &table.id,
                DiagnosticKind::DuplicateColumnName {
                    column: column.name.clone(),
                },
            );
        }
    }
}

/// Rows added before the key was set were never checked against it.
fn check_primary_key(table: &Table, report: &mut DiagnosticReport) {
    let Some(pk) = table.primary_key.as_deref() else {
        return;
    };
    let Some(index) = table.column_index(pk) else {
        report.push(
            &table.id,
            DiagnosticKind::UnknownPrimaryKey {
                column: pk.to_string(),
            },
        );
        return;
    };

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for row in 0..table.max_row_count() {
        let value = normalize(table.cell(row, index));
        if value.is_empty() {
            report.push(
                &table.id,
                DiagnosticKind::EmptyPrimaryKeyValue {
                    column: pk.to_string(),
                    row,
                },
            );
        } else if !seen.insert(value.clone()) && reported.insert(value.clone()) {
            report.push(
                &table.id,
                DiagnosticKind::DuplicatePrimaryKeyValue {
                    column: pk.to_string(),
                    value,
                },
            );
        }
    }
}

fn check_foreign_keys(schema: &Schema, table: &Table, report: &mut DiagnosticReport) {
    for fk in &table.foreign_keys {
        if table.column_index(&fk.column).is_none() {
            report.push(
                &table.id,
                DiagnosticKind::UnknownChildColumn {
                    column: fk.column.clone(),
                },
            );
        }

        match schema.table(&fk.ref_table) {
            None => report.push(
                &table.id,
                DiagnosticKind::UnknownReferencedTable {
                    column: fk.column.clone(),
                    ref_table: fk.ref_table.clone(),
                },
            ),
            Some(parent) if parent.column_index(&fk.ref_column).is_none() => report.push(
                &table.id,
                DiagnosticKind::UnknownReferencedColumn {
                    column: fk.column.clone(),
                    ref_table: fk.ref_table.clone(),
                    ref_column: fk.ref_column.clone(),
                },
            ),
            Some(_) => {}
        }
    }
}
