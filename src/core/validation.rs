//! Naming rules for table and column identifiers.
//!
//! The editor accepts any name while the user types; these rules only feed
//! diagnostics, where every issue is a warning. A name that breaks them is
//! emitted verbatim into the SQL export and may not load everywhere.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum length for identifiers (MySQL standard)
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Keywords that clash with the exported DDL/DML when used unquoted.
static RESERVED_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
        "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
        "END", "EXISTS", "FALSE", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN", "INDEX",
        "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT", "NULL",
        "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE",
        "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN", "WHERE",
        "WITH", "BOOLEAN", "INTEGER", "REAL", "TEXT",
    ]
    .into_iter()
    .collect()
});

/// A single naming problem
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierIssue {
    Empty,
    TooLong { max: usize, actual: usize },
    InvalidCharacters { invalid: Vec<char> },
    StartsWithDigit,
    ReservedKeyword { keyword: String },
    ConsecutiveUnderscores,
}

impl std::fmt::Display for IdentifierIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierIssue::Empty => write!(f, "Name cannot be empty"),
            IdentifierIssue::TooLong { max, actual } => {
                write!(f, "Name is too long ({} chars, max {})", actual, max)
            }
            IdentifierIssue::InvalidCharacters { invalid } => {
                let chars: String = invalid.iter().collect();
                write!(
                    f,
                    "Name contains invalid characters: '{}'. Only letters, numbers, and underscores are allowed",
                    chars
                )
            }
            IdentifierIssue::StartsWithDigit => write!(f, "Name cannot start with a digit"),
            IdentifierIssue::ReservedKeyword { keyword } => {
                write!(f, "'{}' is a reserved SQL keyword", keyword)
            }
            IdentifierIssue::ConsecutiveUnderscores => {
                write!(f, "Name should not contain consecutive underscores")
            }
        }
    }
}

/// Checks a table or column name, returning every issue found.
pub fn check_identifier(name: &str) -> Vec<IdentifierIssue> {
    if name.trim().is_empty() {
        return vec![IdentifierIssue::Empty];
    }

    let mut issues = Vec::new();

    let length = name.chars().count();
    if length > MAX_IDENTIFIER_LENGTH {
        issues.push(IdentifierIssue::TooLong {
            max: MAX_IDENTIFIER_LENGTH,
            actual: length,
        });
    }

    let invalid: Vec<char> = name
        .chars()
        .filter(|c| !c.is_ascii_alphanumeric() && *c != '_')
        .collect();
    if !invalid.is_empty() {
        issues.push(IdentifierIssue::InvalidCharacters { invalid });
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        issues.push(IdentifierIssue::StartsWithDigit);
    }

    if is_reserved_keyword(name) {
        issues.push(IdentifierIssue::ReservedKeyword {
            keyword: name.to_string(),
        });
    }

    if name.contains("__") {
        issues.push(IdentifierIssue::ConsecutiveUnderscores);
    }

    issues
}

/// Check if a string is a reserved keyword
pub fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(name.to_uppercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        for name in ["users", "user_id", "User123", "a", "_internal"] {
            assert!(check_identifier(name).is_empty(), "{name}");
        }
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(check_identifier(""), vec![IdentifierIssue::Empty]);
        assert_eq!(check_identifier("   "), vec![IdentifierIssue::Empty]);
    }

    #[test]
    fn test_too_long_name() {
        assert!(check_identifier(&"a".repeat(64)).is_empty());
        assert_eq!(
            check_identifier(&"a".repeat(65)),
            vec![IdentifierIssue::TooLong { max: 64, actual: 65 }]
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            check_identifier("first name"),
            vec![IdentifierIssue::InvalidCharacters { invalid: vec![' '] }]
        );
        assert!(!check_identifier("user-name").is_empty());
        assert!(!check_identifier("имя").is_empty());
    }

    #[test]
    fn test_starts_with_digit() {
        assert_eq!(check_identifier("1user"), vec![IdentifierIssue::StartsWithDigit]);
    }

    #[test]
    fn test_reserved_keywords() {
        assert!(is_reserved_keyword("order"));
        assert!(is_reserved_keyword("Table"));
        assert!(!is_reserved_keyword("orders"));
        assert_eq!(
            check_identifier("select"),
            vec![IdentifierIssue::ReservedKeyword {
                keyword: "select".into()
            }]
        );
    }

    #[test]
    fn test_consecutive_underscores() {
        assert_eq!(
            check_identifier("some__name"),
            vec![IdentifierIssue::ConsecutiveUnderscores]
        );
    }

    #[test]
    fn test_issue_display() {
        assert_eq!(IdentifierIssue::Empty.to_string(), "Name cannot be empty");
        assert_eq!(
            IdentifierIssue::TooLong {
                max: 64,
                actual: 100
            }
            .to_string(),
            "Name is too long (100 chars, max 64)"
        );
    }
}
