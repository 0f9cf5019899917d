//! Turns a "link created" event from the canvas into a foreign key.
//!
//! Column handles are named `tableId:columnName[:role]`, where the role is
//! `source` or `target`. The connection's target becomes the child table.

use serde::{Deserialize, Serialize};

use super::mutations::Mutation;
use super::schema::TableId;

const ROLE_SUFFIXES: [&str; 2] = [":source", ":target"];

/// One side of a connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub table: TableId,
    pub column: String,
}

impl Endpoint {
    /// Parses a handle id. Returns `None` when the table or column segment is missing.
    pub fn parse(handle: &str) -> Option<Self> {
        let (table, rest) = handle.split_once(':')?;
        let column = ROLE_SUFFIXES
            .iter()
            .find_map(|suffix| rest.strip_suffix(suffix))
            .unwrap_or(rest);

        if table.is_empty() || column.is_empty() {
            return None;
        }

        Some(Self {
            table: TableId::new(table),
            column: column.to_string(),
        })
    }
}

/// Connection event as emitted by the diagram editor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEvent {
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl ConnectionEvent {
    pub fn new(source_handle: impl Into<String>, target_handle: impl Into<String>) -> Self {
        Self {
            source_handle: Some(source_handle.into()),
            target_handle: Some(target_handle.into()),
        }
    }
}

/// Maps a connection to `AddForeignKey(target -> source)`.
///
/// Malformed handles yield `None`; this is not an error.
pub fn translate(event: &ConnectionEvent) -> Option<Mutation> {
    let source = Endpoint::parse(event.source_handle.as_deref()?)?;
    let target = Endpoint::parse(event.target_handle.as_deref()?)?;

    Some(Mutation::AddForeignKey {
        child: target.table,
        child_column: target.column,
        parent: source.table,
        parent_column: source.column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(
            Endpoint::parse("3:user_id:target"),
            Some(Endpoint {
                table: TableId::new("3"),
                column: "user_id".into()
            })
        );
        assert_eq!(
            Endpoint::parse("3:user_id").map(|e| e.column),
            Some("user_id".to_string())
        );
        // Only known role suffixes are stripped
        assert_eq!(
            Endpoint::parse("3:a:b").map(|e| e.column),
            Some("a:b".to_string())
        );
    }

    #[test]
    fn test_parse_malformed_endpoint() {
        assert_eq!(Endpoint::parse("3"), None);
        assert_eq!(Endpoint::parse("3:"), None);
        assert_eq!(Endpoint::parse("3::source"), None);
        assert_eq!(Endpoint::parse(":col"), None);
        assert_eq!(Endpoint::parse(""), None);
    }

    #[test]
    fn test_translate_target_is_child() {
        let event = ConnectionEvent::new("1:id:source", "2:user_id:target");
        assert_eq!(
            translate(&event),
            Some(Mutation::AddForeignKey {
                child: TableId::new("2"),
                child_column: "user_id".into(),
                parent: TableId::new("1"),
                parent_column: "id".into(),
            })
        );
    }

    #[test]
    fn test_translate_ignores_malformed() {
        assert_eq!(translate(&ConnectionEvent::new("1", "2:user_id")), None);
        assert_eq!(translate(&ConnectionEvent::default()), None);
    }

    #[test]
    fn test_event_from_json() {
        let event: ConnectionEvent = serde_json::from_str(
            r#"{"sourceHandle": "1:id:source", "targetHandle": "2:user_id:target"}"#,
        )
        .unwrap();
        assert!(translate(&event).is_some());
    }
}
