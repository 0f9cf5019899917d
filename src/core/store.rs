//! Schema store: owns the current snapshot and the undo/redo history.
//!
//! There is a single writer. Readers hold `Arc<Schema>` snapshots, which are
//! never modified after they are published.

use std::collections::VecDeque;
use std::sync::Arc;

use super::config::Config;
use super::connection::{ConnectionEvent, translate};
use super::erd_export::generate_erd;
use super::error::SchemaError;
use super::mutations::Mutation;
use super::schema::{Column, Schema, TableId};
use super::sql_export::generate_sql;

pub struct SchemaStore {
    current: Arc<Schema>,
    undo: VecDeque<Arc<Schema>>,
    redo: Vec<Arc<Schema>>,
    history_limit: usize,
    revision: u64,
}

impl Default for SchemaStore {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl SchemaStore {
    pub fn new(config: &Config) -> Self {
        Self {
            current: Arc::new(Schema::with_config(config)),
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit: config.history_limit,
            revision: 0,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Schema> {
        Arc::clone(&self.current)
    }

    /// Number of snapshots published so far (undo/redo included)
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Applies a mutation and publishes the resulting snapshot.
    ///
    /// On error the current snapshot stays in place.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<Arc<Schema>, SchemaError> {
        match self.current.apply(mutation) {
            Ok(next) => {
                tracing::debug!("Applied {} (revision {})", mutation.name(), self.revision + 1);
                self.publish(next);
                Ok(self.snapshot())
            }
            Err(e) => {
                if e.is_silent() {
                    tracing::debug!("Ignored {}: {}", mutation.name(), e);
                } else {
                    tracing::warn!("Rejected {}: {}", mutation.name(), e);
                }
                Err(e)
            }
        }
    }

    /// Creates a table and returns its id.
    pub fn create_table(
        &mut self,
        name: &str,
        columns: Vec<Column>,
        primary_key: &str,
    ) -> Result<TableId, SchemaError> {
        match self.current.create_table(name, columns, primary_key) {
            Ok((next, id)) => {
                tracing::info!("Created table {}", id);
                self.publish(next);
                Ok(id)
            }
            Err(e) => {
                tracing::warn!("Rejected create_table: {}", e);
                Err(e)
            }
        }
    }

    /// Handles a connection drawn on the canvas.
    ///
    /// Returns `Ok(false)` when the handles are malformed and nothing changed.
    pub fn connect(&mut self, event: &ConnectionEvent) -> Result<bool, SchemaError> {
        let Some(mutation) = translate(event) else {
            tracing::debug!("Ignoring connection with malformed handles: {:?}", event);
            return Ok(false);
        };
        self.apply(&mutation).map(|_| true)
    }

    fn publish(&mut self, next: Schema) {
        // A no-op edit (e.g. a blank row) does not create a history entry.
        if next.same_tables(&self.current) {
            return;
        }

        let previous = std::mem::replace(&mut self.current, Arc::new(next));
        if self.history_limit > 0 {
            self.undo.push_back(previous);
            while self.undo.len() > self.history_limit {
                self.undo.pop_front();
            }
        }
        self.redo.clear();
        self.revision += 1;
    }

    /// Restores the previous snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.redo.push(current);
        self.revision += 1;
        tracing::info!("Undo (revision {})", self.revision);
        true
    }

    /// Re-applies the last undone snapshot.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.undo.push_back(current);
        self.revision += 1;
        tracing::info!("Redo (revision {})", self.revision);
        true
    }

    /// SQL script for the current snapshot
    pub fn export_sql(&self) -> String {
        generate_sql(&self.current)
    }

    /// Diagram text for the current snapshot
    pub fn export_erd(&self) -> String {
        generate_erd(&self.current)
    }
}
