//! Table Sketch - in-memory relational table editor
//!
//! Tables with typed columns, an optional primary key, foreign keys and row
//! data, edited through immutable snapshots. Every snapshot can be exported
//! as a SQL script or as a Mermaid-style ER diagram.

pub mod core;
