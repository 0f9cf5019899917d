//! Syntax check for exported SQL
//!
//! Table and column names are emitted exactly as the user typed them, so a
//! name like `order` or `first name` produces a script that does not parse.
//! This module runs the script through sqlparser-rs and reports where it
//! breaks, without touching the schema.

use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::{Parser, ParserError};

use super::schema::Schema;
use super::sql_export::generate_sql;

/// Position in SQL source code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
}

/// Parse failure with the location reported by the parser, when it gave one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct SqlSyntaxError {
    pub message: String,
    pub position: Option<SourcePosition>,
    pub suggestion: Option<String>,
}

/// Summary of a script that parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlSummary {
    pub statement_count: usize,
    pub table_count: usize,
    pub insert_count: usize,
}

/// Parses `sql` with the SQLite dialect.
pub fn check_sql(sql: &str) -> Result<SqlSummary, SqlSyntaxError> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql).map_err(|e| syntax_error(&e))?;

    let mut summary = SqlSummary {
        statement_count: statements.len(),
        ..SqlSummary::default()
    };
    for statement in &statements {
        match statement {
            Statement::CreateTable(_) => summary.table_count += 1,
            Statement::Insert(_) => summary.insert_count += 1,
            _ => {}
        }
    }
    Ok(summary)
}

/// Generates SQL for `schema` and checks it.
pub fn check_schema_sql(schema: &Schema) -> Result<SqlSummary, SqlSyntaxError> {
    let result = check_sql(&generate_sql(schema));
    if let Err(ref e) = result {
        tracing::debug!("Exported SQL does not parse: {}", e);
    }
    result
}

fn syntax_error(error: &ParserError) -> SqlSyntaxError {
    let message = error.to_string();
    SqlSyntaxError {
        position: extract_position(&message),
        suggestion: suggestion_for(&message),
        message,
    }
}

/// Pulls `Line: X, Column: Y` out of a sqlparser message.
fn extract_position(message: &str) -> Option<SourcePosition> {
    let number_after = |label: &str| {
        let start = message.find(label)? + label.len();
        let digits: String = message[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse::<usize>().ok()
    };

    Some(SourcePosition {
        line: number_after("Line: ")?,
        column: number_after("Column: ")?,
    })
}

fn suggestion_for(message: &str) -> Option<String> {
    if message.contains("Expected: identifier") || message.contains("Expected identifier") {
        Some("A table or column name is probably a reserved word.".into())
    } else if message.contains("Expected: ,") || message.contains("Expected: )") {
        Some("A table or column name probably contains spaces or punctuation.".into())
    } else {
        None
    }
}
