//! Editor configuration from environment variables.
//!
//! Use `Config::load()` to read a `.env` file first, or `Config::from_env()`
//! when the environment is already set up.

use std::str::FromStr;

pub const DEFAULT_TABLE_PREFIX: &str = "Table";
pub const DEFAULT_CANVAS_ORIGIN: (f64, f64) = (100.0, 100.0);
pub const DEFAULT_CANVAS_STEP: f64 = 20.0;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name prefix for tables created without a name
    /// Example: `Table` gives Table1, Table2, ...
    pub table_prefix: String,

    /// Canvas position of the first table
    pub canvas_origin: (f64, f64),

    /// Diagonal offset between consecutive new tables
    pub canvas_step: f64,

    /// Number of undo steps kept by the store
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            canvas_origin: DEFAULT_CANVAS_ORIGIN,
            canvas_step: DEFAULT_CANVAS_STEP,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and then read the environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Read configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (environment, tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(prefix) = lookup("TABLESKETCH_TABLE_PREFIX").filter(|p| !p.trim().is_empty()) {
            config.table_prefix = prefix.trim().to_string();
        }

        if let Some(origin) = lookup("TABLESKETCH_CANVAS_ORIGIN").and_then(|v| parse_pair(&v)) {
            config.canvas_origin = origin;
        }

        if let Some(step) = lookup("TABLESKETCH_CANVAS_STEP").and_then(|v| parse_value::<f64>(&v))
        {
            config.canvas_step = step;
        }

        match lookup("TABLESKETCH_HISTORY_LIMIT").map(|v| parse_value::<usize>(&v)) {
            Some(Some(limit)) => config.history_limit = limit,
            Some(None) => tracing::warn!("Ignoring invalid TABLESKETCH_HISTORY_LIMIT"),
            None => {}
        }

        config
    }

    /// Check if a custom table name prefix is configured
    pub fn has_table_prefix(&self) -> bool {
        self.table_prefix != DEFAULT_TABLE_PREFIX
    }

    /// Check if canvas placement differs from the defaults
    pub fn has_canvas_layout(&self) -> bool {
        self.canvas_origin != DEFAULT_CANVAS_ORIGIN || self.canvas_step != DEFAULT_CANVAS_STEP
    }

    /// Check if a custom history limit is configured
    pub fn has_history_limit(&self) -> bool {
        self.history_limit != DEFAULT_HISTORY_LIMIT
    }
}

fn parse_value<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// Parses `x,y`.
fn parse_pair(value: &str) -> Option<(f64, f64)> {
    let (x, y) = value.split_once(',')?;
    Some((parse_value(x)?, parse_value(y)?))
}
