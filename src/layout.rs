//! Print layout: per-column rendering and diff directives
//!
//! One [`LayoutEntry`] per `(table, column)` pair says whether the column is
//! rendered, where it falls in the table's sort key, whether its changes are
//! ignored by the differ, and whether it anchors or links to a bookmark.

use crate::error::{DriftError, Result};
use crate::snapshot::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub table: usize,
    pub column: usize,
    #[serde(default)]
    pub hidden: bool,
    /// Position in the table's ascending multi-column sort key
    #[serde(default)]
    pub sort_order: Option<u32>,
    /// Column of the same table whose value names the bookmark anchored here
    #[serde(default)]
    pub bookmark: Option<usize>,
    /// Column of the same table whose value names the bookmark linked to from here
    #[serde(default)]
    pub jump_to_bookmark: Option<usize>,
    #[serde(default)]
    pub change_ignored: bool,
    /// Section id used when hashing bookmark names; defaults to the diffgram name
    #[serde(default)]
    pub bookmark_scope: Option<String>,
}

/// Bookmark wiring of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkRole<'a> {
    Anchor {
        text_column: usize,
        scope: Option<&'a str>,
    },
    Jump {
        text_column: usize,
        scope: Option<&'a str>,
    },
}

impl LayoutEntry {
    /// A visible, unsorted column with no bookmark wiring
    pub fn new(table: usize, column: usize) -> Self {
        Self {
            table,
            column,
            hidden: false,
            sort_order: None,
            bookmark: None,
            jump_to_bookmark: None,
            change_ignored: false,
            bookmark_scope: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn sorted(mut self, order: u32) -> Self {
        self.sort_order = Some(order);
        self
    }

    pub fn ignore_changes(mut self) -> Self {
        self.change_ignored = true;
        self
    }

    pub fn bookmark(mut self, text_column: usize) -> Self {
        self.bookmark = Some(text_column);
        self
    }

    pub fn jump_to(mut self, text_column: usize) -> Self {
        self.jump_to_bookmark = Some(text_column);
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.bookmark_scope = Some(scope.into());
        self
    }

    pub fn bookmark_role(&self) -> Option<BookmarkRole<'_>> {
        let scope = self.bookmark_scope.as_deref();
        match (self.bookmark, self.jump_to_bookmark) {
            (Some(text_column), _) => Some(BookmarkRole::Anchor { text_column, scope }),
            (None, Some(text_column)) => Some(BookmarkRole::Jump { text_column, scope }),
            (None, None) => None,
        }
    }
}

/// All layout entries of one report section, keyed by `(table, column)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintLayout {
    entries: BTreeMap<(usize, usize), LayoutEntry>,
}

impl PrintLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of entries, rejecting duplicate `(table, column)` pairs
    pub fn from_entries(entries: impl IntoIterator<Item = LayoutEntry>) -> Result<Self> {
        let mut layout = Self::new();
        for entry in entries {
            layout.insert(entry)?;
        }
        Ok(layout)
    }

    /// A layout rendering every column of every table, unsorted
    pub fn all_visible(tables: &[Table]) -> Self {
        let entries = tables
            .iter()
            .enumerate()
            .flat_map(|(level, table)| {
                table
                    .columns()
                    .iter()
                    .map(move |column| ((level, column.ordinal), LayoutEntry::new(level, column.ordinal)))
            })
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, entry: LayoutEntry) -> Result<()> {
        let key = (entry.table, entry.column);
        if self.entries.contains_key(&key) {
            return Err(DriftError::layout(format!(
                "duplicate layout entry for table {} column {}",
                entry.table, entry.column
            )));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn entry(&self, table: usize, column: usize) -> Option<&LayoutEntry> {
        self.entries.get(&(table, column))
    }

    pub fn entries(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.values()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn table_entries(&self, table: usize) -> impl Iterator<Item = &LayoutEntry> {
        self.entries
            .range((table, 0)..=(table, usize::MAX))
            .map(|(_, entry)| entry)
    }

    /// Rendered columns of a table, in column ordinal order
    pub fn visible_columns(&self, table: usize) -> Vec<usize> {
        self.table_entries(table)
            .filter(|e| !e.hidden)
            .map(|e| e.column)
            .collect()
    }

    /// Sort key columns of a table, ordered by ascending `sort_order`
    pub fn sort_columns(&self, table: usize) -> Vec<usize> {
        let mut sorted: Vec<(u32, usize)> = self
            .table_entries(table)
            .filter_map(|e| e.sort_order.map(|order| (order, e.column)))
            .collect();
        sorted.sort();
        sorted.into_iter().map(|(_, column)| column).collect()
    }

    /// Columns whose differences never make a row Modified
    pub fn ignored_columns(&self, table: usize) -> Vec<usize> {
        self.table_entries(table)
            .filter(|e| e.change_ignored)
            .map(|e| e.column)
            .collect()
    }

    /// Number of visible cells in one physical row spanning every level
    pub fn max_visible_cells(&self, levels: usize) -> usize {
        (0..levels).map(|level| self.visible_columns(level).len()).sum()
    }

    /// Cell position at which the columns of `level` start
    pub fn level_offset(&self, level: usize) -> usize {
        (0..level).map(|l| self.visible_columns(l).len()).sum()
    }

    /// Check every entry against the tables it describes
    pub fn validate(&self, tables: &[Table]) -> Result<()> {
        for entry in self.entries.values() {
            let table = tables.get(entry.table).ok_or_else(|| {
                DriftError::layout(format!(
                    "layout references table {} but only {} tables exist",
                    entry.table,
                    tables.len()
                ))
            })?;
            let width = table.columns().len();
            if entry.column >= width {
                return Err(DriftError::layout(format!(
                    "layout references column {} of table '{}' which has {} columns",
                    entry.column,
                    table.name(),
                    width
                )));
            }
            if entry.bookmark.is_some() && entry.jump_to_bookmark.is_some() {
                return Err(DriftError::layout(format!(
                    "column {} of table '{}' is both a bookmark and a jump source",
                    entry.column,
                    table.name()
                )));
            }
            if let Some(target) = entry.bookmark.or(entry.jump_to_bookmark) {
                if target >= width {
                    return Err(DriftError::layout(format!(
                        "bookmark text column {} out of range for table '{}'",
                        target,
                        table.name()
                    )));
                }
            }
        }
        Ok(())
    }
}
