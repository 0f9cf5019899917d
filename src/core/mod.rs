//! Core domain models and business logic for table sketches

pub mod config;
pub mod connection;
pub mod constraints;
pub mod diagnostics;
pub mod erd_export;
mod error;
mod mutations;
mod schema;
pub mod sql_check;
pub mod sql_export;
pub mod store;
pub mod validation;

pub use config::Config;
pub use connection::{ConnectionEvent, translate};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticReport, Severity, diagnose};
pub use erd_export::{generate_erd, sanitize};
pub use error::SchemaError;
pub use mutations::Mutation;
pub use schema::*;
pub use sql_check::{SqlSummary, SqlSyntaxError, check_schema_sql, check_sql};
pub use sql_export::generate_sql;
pub use store::SchemaStore;
