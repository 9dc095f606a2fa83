//! Row-level change detection between a pilot and a production table

use crate::error::{DriftError, Result};
use crate::logging::LogContext;
use crate::snapshot::{Column, Table, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Classification of a diff row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowState {
    Unchanged,
    Modified,
    Added,
    Deleted,
}

impl RowState {
    pub const ALL: [RowState; 4] = [
        RowState::Unchanged,
        RowState::Modified,
        RowState::Added,
        RowState::Deleted,
    ];

    /// Name used as the CSS class of rendered rows
    pub fn as_str(&self) -> &'static str {
        match self {
            RowState::Unchanged => "Unchanged",
            RowState::Modified => "Modified",
            RowState::Added => "Added",
            RowState::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The values a diff row carries, by state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowChange {
    Unchanged { values: Vec<Value> },
    Modified { values: Vec<Value>, old_values: Vec<Value> },
    Added { values: Vec<Value> },
    Deleted { old_values: Vec<Value> },
}

impl RowChange {
    pub fn state(&self) -> RowState {
        match self {
            RowChange::Unchanged { .. } => RowState::Unchanged,
            RowChange::Modified { .. } => RowState::Modified,
            RowChange::Added { .. } => RowState::Added,
            RowChange::Deleted { .. } => RowState::Deleted,
        }
    }

    /// Current values; for a deleted row these are the production values
    pub fn values(&self) -> &[Value] {
        match self {
            RowChange::Unchanged { values }
            | RowChange::Modified { values, .. }
            | RowChange::Added { values } => values,
            RowChange::Deleted { old_values } => old_values,
        }
    }

    /// Production values, present only for modified and deleted rows
    pub fn old_values(&self) -> Option<&[Value]> {
        match self {
            RowChange::Modified { old_values, .. } | RowChange::Deleted { old_values } => {
                Some(old_values.as_slice())
            }
            _ => None,
        }
    }

    pub fn value(&self, column: usize) -> Option<&Value> {
        self.values().get(column)
    }

    pub fn old_value(&self, column: usize) -> Option<&Value> {
        self.old_values().and_then(|old| old.get(column))
    }

    /// True when the row is modified and this particular cell differs
    pub fn cell_changed(&self, column: usize) -> bool {
        match self {
            RowChange::Modified { values, old_values } => values.get(column) != old_values.get(column),
            _ => false,
        }
    }
}

/// A row of a diff table together with its visibility flag
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    pub change: RowChange,
    /// Set when this row and its whole subtree are unchanged
    pub can_hide: bool,
}

impl DiffRow {
    pub fn new(change: RowChange) -> Self {
        Self {
            change,
            can_hide: false,
        }
    }

    pub fn state(&self) -> RowState {
        self.change.state()
    }
}

/// Row counts per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffCounts {
    pub unchanged: usize,
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
}

impl DiffCounts {
    pub fn record(&mut self, state: RowState) {
        match state {
            RowState::Unchanged => self.unchanged += 1,
            RowState::Modified => self.modified += 1,
            RowState::Added => self.added += 1,
            RowState::Deleted => self.deleted += 1,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.modified + self.added + self.deleted > 0
    }

    pub fn total_changes(&self) -> usize {
        self.modified + self.added + self.deleted
    }

    pub fn total(&self) -> usize {
        self.unchanged + self.total_changes()
    }
}

/// Result of diffing one pilot table against its production counterpart
#[derive(Debug, Clone)]
pub struct DiffTable {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<usize>,
    rows: Vec<DiffRow>,
    keys: HashSet<Vec<Value>>,
}

impl DiffTable {
    /// Empty diff table with the schema of `source`
    pub fn with_schema_of(source: &Table) -> Self {
        Self {
            name: source.name().to_string(),
            columns: source.columns().to_vec(),
            primary_key: source.primary_key().to_vec(),
            rows: Vec::new(),
            keys: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn primary_key(&self) -> &[usize] {
        &self.primary_key
    }

    pub fn is_key_column(&self, column: usize) -> bool {
        self.primary_key.contains(&column)
    }

    pub fn rows(&self) -> &[DiffRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [DiffRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows_in_state(&self, state: RowState) -> impl Iterator<Item = &DiffRow> {
        self.rows.iter().filter(move |r| r.state() == state)
    }

    /// Key tuple of a diff row
    pub fn key_of(&self, row: &DiffRow) -> Vec<Value> {
        self.primary_key
            .iter()
            .map(|&c| row.change.value(c).cloned().unwrap_or(Value::Null))
            .collect()
    }

    pub fn counts(&self) -> DiffCounts {
        let mut counts = DiffCounts::default();
        for row in &self.rows {
            counts.record(row.state());
        }
        counts
    }

    /// Append a row, rejecting a key that is already present
    pub fn insert(&mut self, change: RowChange) -> Result<()> {
        if change.values().len() != self.columns.len() {
            return Err(DriftError::row_rejected(
                &self.name,
                format!(
                    "expected {} values, got {}",
                    self.columns.len(),
                    change.values().len()
                ),
            ));
        }
        let row = DiffRow::new(change);
        let key = self.key_of(&row);
        if !self.keys.insert(key.clone()) {
            return Err(DriftError::row_rejected(
                &self.name,
                format!("duplicate key {:?} in diff output", key),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a row, logging and dropping it on rejection
    pub fn push(&mut self, change: RowChange, ctx: &LogContext) -> bool {
        match self.insert(change) {
            Ok(()) => true,
            Err(e) => {
                ctx.warn(format!("dropping diff row: {}", e));
                false
            }
        }
    }

    /// Keep only the rows `keep` accepts; returns how many were removed
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&DiffRow) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        let primary_key = &self.primary_key;
        self.keys = self
            .rows
            .iter()
            .map(|row| {
                primary_key
                    .iter()
                    .map(|&c| row.change.value(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        before - self.rows.len()
    }

    /// Stable ascending sort by the given columns, compared in order
    pub fn sort_by_columns(&mut self, columns: &[usize]) {
        if columns.is_empty() {
            return;
        }
        self.rows.sort_by(|a, b| {
            columns
                .iter()
                .map(|&c| a.change.value(c).cmp(&b.change.value(c)))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Table differ
pub struct ChangeDetector;

impl ChangeDetector {
    /// Classify every pilot and production row as unchanged, modified,
    /// added or deleted. Rows are matched on their primary key tuple;
    /// `ignored_columns` never make a matched pair Modified.
    pub fn diff_tables(
        pilot: &Table,
        production: &Table,
        ignored_columns: &[usize],
        ctx: &LogContext,
    ) -> Result<DiffTable> {
        pilot.ensure_same_schema(production)?;
        let ctx = ctx.table(pilot.name());

        if let Some(&bad) = ignored_columns.iter().find(|&&c| c >= pilot.columns().len()) {
            return Err(DriftError::layout(format!(
                "ignored column {} out of range for table '{}'",
                bad,
                pilot.name()
            )));
        }

        let compared: Vec<usize> = (0..pilot.columns().len())
            .filter(|c| !pilot.is_key_column(*c) && !ignored_columns.contains(c))
            .collect();

        let mut diff = DiffTable::with_schema_of(pilot);

        for row in pilot.rows() {
            let key = pilot.key_of(&row.values);
            let change = match production.find_by_key(&key) {
                Some(prior) if Self::same_values(&row.values, &prior.values, &compared) => {
                    RowChange::Unchanged {
                        values: row.values.clone(),
                    }
                }
                Some(prior) => RowChange::Modified {
                    values: row.values.clone(),
                    old_values: prior.values.clone(),
                },
                None => RowChange::Added {
                    values: row.values.clone(),
                },
            };
            diff.push(change, &ctx);
        }

        for row in production.rows() {
            let key = production.key_of(&row.values);
            if pilot.find_by_key(&key).is_some() {
                continue;
            }
            if row.vanity {
                ctx.debug(format!("suppressing deleted placeholder row {:?}", key));
                continue;
            }
            diff.push(
                RowChange::Deleted {
                    old_values: row.values.clone(),
                },
                &ctx,
            );
        }

        let counts = diff.counts();
        ctx.debug(format!(
            "{} unchanged, {} modified, {} added, {} deleted",
            counts.unchanged, counts.modified, counts.added, counts.deleted
        ));

        Ok(diff)
    }

    fn same_values(current: &[Value], prior: &[Value], columns: &[usize]) -> bool {
        columns.iter().all(|&c| current.get(c) == prior.get(c))
    }
}
