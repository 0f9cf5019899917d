//! Cell and primary-key checks applied when rows are written.
//!
//! Checks run only at the moment of a mutation. Nothing here re-validates
//! values that are already stored.

use super::error::SchemaError;
use super::schema::{Column, ColumnType, Table};

const BOOLEAN_TRUE: [&str; 3] = ["true", "1", "yes"];
const BOOLEAN_FALSE: [&str; 3] = ["false", "0", "no"];

/// Normalizes an incoming row value: missing becomes empty, the rest is trimmed.
pub fn normalize(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Whether `value` is acceptable for `column_type`. Blank always passes (NULL).
pub fn accepts(column_type: ColumnType, value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }

    match column_type {
        ColumnType::Text => true,
        ColumnType::Integer => is_integer(trimmed),
        ColumnType::Real => is_real(trimmed),
        ColumnType::Boolean => parse_boolean(trimmed).is_some(),
    }
}

/// Optional leading `-` followed by at least one ASCII digit.
fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Finite decimal number; `NaN` and infinities are rejected.
fn is_real(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Reads one of `true/false/1/0/yes/no`, case-insensitively and ignoring
/// surrounding whitespace.
pub fn parse_boolean(value: &str) -> Option<bool> {
    let lower = value.trim().to_lowercase();
    if BOOLEAN_TRUE.contains(&lower.as_str()) {
        Some(true)
    } else if BOOLEAN_FALSE.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Validates a raw edit for `column` and returns the text to store.
///
/// Blank input is stored as the empty string. Typed values are stored
/// trimmed; TEXT keeps the input as typed.
pub fn check_cell(column: &Column, raw: &str) -> Result<String, SchemaError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !accepts(column.column_type, raw) {
        return Err(SchemaError::InvalidCellType {
            column: column.name.clone(),
            column_type: column.column_type,
            value: raw.to_string(),
        });
    }
    match column.column_type {
        ColumnType::Text => Ok(raw.to_string()),
        _ => Ok(trimmed.to_string()),
    }
}

/// Primary key must be present and unique among the values already stored.
///
/// `row` is the normalized row about to be appended.
pub fn check_primary_key(table: &Table, row: &[String]) -> Result<(), SchemaError> {
    let (Some(index), Some(column)) = (table.primary_key_index(), table.primary_key.as_deref())
    else {
        return Ok(());
    };

    let value = row.get(index).map(|v| v.trim()).unwrap_or_default();
    if value.is_empty() {
        return Err(SchemaError::EmptyPrimaryKey {
            column: column.to_string(),
        });
    }

    let existing = table.values.get(index).map(Vec::as_slice).unwrap_or_default();
    if existing.iter().any(|v| v.trim() == value) {
        return Err(SchemaError::DuplicatePrimaryKey {
            column: column.to_string(),
            value: value.to_string(),
        });
    }

    Ok(())
}
