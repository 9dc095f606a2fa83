//! In-memory relational snapshot of one report section
//!
//! A [`Snapshot`] is an ordered chain of [`Table`]s where table `i` is the
//! parent of table `i + 1`, linked by a [`Relation`] on equal column values.
//! Two snapshots (pilot and production) with identical schema are built per
//! report section and handed to the differ.

use crate::error::{DriftError, Result};
use crate::layout::PrintLayout;
use crate::logging::LogContext;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    #[serde(alias = "text")]
    String,
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "bool")]
    Boolean,
}

impl ColumnType {
    /// Whether a value may be stored in a column of this type. Null is
    /// accepted everywhere except in key columns, which the table checks.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (ColumnType::String, Value::Text(_))
                | (ColumnType::Integer, Value::Int(_))
                | (ColumnType::Boolean, Value::Bool(_))
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub ordinal: usize,
}

/// A stored row. Vanity rows are placeholders inserted only so that an
/// otherwise empty table renders a "nothing configured" line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub values: Vec<Value>,
    pub vanity: bool,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            vanity: false,
        }
    }

    pub fn vanity(values: Vec<Value>) -> Self {
        Self {
            values,
            vanity: true,
        }
    }
}

/// A table with typed columns and an ordered primary key
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<usize>,
    rows: Vec<Row>,
    /// Key tuple to row position, in insertion order
    index: IndexMap<Vec<Value>, usize>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            rows: Vec::new(),
            index: IndexMap::new(),
        }
    }

    /// Append a column and return its ordinal
    pub fn add_column(&mut self, name: impl Into<String>, data_type: ColumnType) -> Result<usize> {
        let name = name.into();
        if !self.rows.is_empty() {
            return Err(DriftError::schema_mismatch(format!(
                "cannot add column '{}' to table '{}' after rows were inserted",
                name, self.name
            )));
        }
        if self.column_index(&name).is_some() {
            return Err(DriftError::schema_mismatch(format!(
                "duplicate column '{}' in table '{}'",
                name, self.name
            )));
        }

        let ordinal = self.columns.len();
        self.columns.push(Column {
            name,
            data_type,
            ordinal,
        });
        Ok(ordinal)
    }

    /// Declare the primary key by column names; order matters
    pub fn set_primary_key(&mut self, columns: &[&str]) -> Result<()> {
        if columns.is_empty() {
            return Err(DriftError::schema_mismatch(format!(
                "table '{}' needs at least one primary key column",
                self.name
            )));
        }
        if !self.rows.is_empty() {
            return Err(DriftError::schema_mismatch(format!(
                "cannot change the primary key of table '{}' after rows were inserted",
                self.name
            )));
        }

        let mut key = Vec::with_capacity(columns.len());
        for name in columns {
            let ordinal = self.column_index(name).ok_or_else(|| {
                DriftError::schema_mismatch(format!(
                    "primary key column '{}' not found in table '{}'",
                    name, self.name
                ))
            })?;
            if key.contains(&ordinal) {
                return Err(DriftError::schema_mismatch(format!(
                    "primary key column '{}' listed twice in table '{}'",
                    name, self.name
                )));
            }
            key.push(ordinal);
        }

        self.primary_key = key;
        Ok(())
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

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn is_key_column(&self, column: usize) -> bool {
        self.primary_key.contains(&column)
    }

    /// Extract the key tuple of a row, in key-column order
    pub fn key_of(&self, values: &[Value]) -> Vec<Value> {
        self.primary_key
            .iter()
            .map(|&c| values.get(c).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// First row whose key tuple equals `key`
    pub fn find_by_key(&self, key: &[Value]) -> Option<&Row> {
        self.index.get(key).map(|&pos| &self.rows[pos])
    }

    /// Insert a row, rejecting arity, type, null-key and duplicate-key violations
    pub fn insert(&mut self, row: Row) -> Result<()> {
        if self.primary_key.is_empty() {
            return Err(DriftError::row_rejected(&self.name, "table has no primary key"));
        }
        if row.values.len() != self.columns.len() {
            return Err(DriftError::row_rejected(
                &self.name,
                format!(
                    "expected {} values, got {}",
                    self.columns.len(),
                    row.values.len()
                ),
            ));
        }
        for (column, value) in self.columns.iter().zip(&row.values) {
            if !column.data_type.accepts(value) {
                return Err(DriftError::row_rejected(
                    &self.name,
                    format!(
                        "value {:?} does not fit {} column '{}'",
                        value, column.data_type, column.name
                    ),
                ));
            }
        }

        let key = self.key_of(&row.values);
        if let Some(pos) = key.iter().position(Value::is_null) {
            let column = &self.columns[self.primary_key[pos]];
            return Err(DriftError::row_rejected(
                &self.name,
                format!("null in key column '{}'", column.name),
            ));
        }
        if self.index.contains_key(&key) {
            return Err(DriftError::row_rejected(
                &self.name,
                format!("duplicate key {:?}", key),
            ));
        }

        self.index.insert(key, self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    /// Insert a row, logging and dropping it if the table rejects it.
    /// Returns whether the row was stored.
    pub fn add_row(&mut self, row: Row, ctx: &LogContext) -> bool {
        match self.insert(row) {
            Ok(()) => true,
            Err(e) => {
                ctx.table(&self.name).warn(format!("dropping row: {}", e));
                false
            }
        }
    }

    /// Fail unless `other` has the same name, columns and primary key
    pub fn ensure_same_schema(&self, other: &Table) -> Result<()> {
        if self.name != other.name {
            return Err(DriftError::schema_mismatch(format!(
                "table '{}' does not match table '{}'",
                self.name, other.name
            )));
        }
        if self.columns != other.columns {
            return Err(DriftError::schema_mismatch(format!(
                "columns of table '{}' differ between snapshots",
                self.name
            )));
        }
        if self.primary_key != other.primary_key {
            return Err(DriftError::schema_mismatch(format!(
                "primary key of table '{}' differs between snapshots",
                self.name
            )));
        }
        Ok(())
    }
}

/// Equi-join link from a parent table level to the next level down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub parent_columns: Vec<usize>,
    pub child_columns: Vec<usize>,
}

impl Relation {
    pub fn parent_key(&self, values: &[Value]) -> Vec<Value> {
        project(values, &self.parent_columns)
    }

    pub fn child_key(&self, values: &[Value]) -> Vec<Value> {
        project(values, &self.child_columns)
    }
}

fn project(values: &[Value], columns: &[usize]) -> Vec<Value> {
    columns
        .iter()
        .map(|&c| values.get(c).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Ordered chain of tables plus relations and print layout
#[derive(Debug, Clone)]
pub struct Snapshot {
    name: String,
    tables: Vec<Table>,
    /// `relations[i]` links `tables[i]` to `tables[i + 1]`
    relations: Vec<Relation>,
    layout: PrintLayout,
}

impl Snapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            relations: Vec::new(),
            layout: PrintLayout::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a table at the next level and return its index
    pub fn add_table(&mut self, table: Table) -> usize {
        self.tables.push(table);
        self.tables.len() - 1
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, level: usize) -> Option<&Table> {
        self.tables.get(level)
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn layout(&self) -> &PrintLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: PrintLayout) {
        self.layout = layout;
    }

    /// Link table `parent_level` to `parent_level + 1` by column names.
    /// Relations must be added top-down, one per adjacent pair.
    pub fn relate(
        &mut self,
        parent_level: usize,
        parent_columns: &[&str],
        child_columns: &[&str],
    ) -> Result<()> {
        if parent_level != self.relations.len() {
            return Err(DriftError::schema_mismatch(format!(
                "expected relation for level {}, got level {}",
                self.relations.len(),
                parent_level
            )));
        }
        let (parent, child) = match (self.tables.get(parent_level), self.tables.get(parent_level + 1)) {
            (Some(p), Some(c)) => (p, c),
            _ => {
                return Err(DriftError::schema_mismatch(format!(
                    "no table pair at levels {} and {}",
                    parent_level,
                    parent_level + 1
                )))
            }
        };

        let resolve = |table: &Table, names: &[&str]| -> Result<Vec<usize>> {
            names
                .iter()
                .map(|name| {
                    table.column_index(name).ok_or_else(|| {
                        DriftError::schema_mismatch(format!(
                            "relation column '{}' not found in table '{}'",
                            name,
                            table.name()
                        ))
                    })
                })
                .collect()
        };

        let relation = Relation {
            parent_columns: resolve(parent, parent_columns)?,
            child_columns: resolve(child, child_columns)?,
        };
        validate_relation(parent, child, &relation)?;
        self.relations.push(relation);
        Ok(())
    }

    /// Check the relation chain and print layout against the tables
    pub fn validate(&self) -> Result<()> {
        if self.relations.len() != self.tables.len().saturating_sub(1) {
            return Err(DriftError::schema_mismatch(format!(
                "snapshot '{}' has {} tables but {} relations",
                self.name,
                self.tables.len(),
                self.relations.len()
            )));
        }
        for (level, relation) in self.relations.iter().enumerate() {
            validate_relation(&self.tables[level], &self.tables[level + 1], relation)?;
        }
        self.layout.validate(&self.tables)
    }

    /// Fail unless both snapshots have identical tables, keys and relations
    pub fn ensure_same_schema(&self, other: &Snapshot) -> Result<()> {
        if self.tables.len() != other.tables.len() {
            return Err(DriftError::schema_mismatch(format!(
                "snapshot '{}' has {} tables, snapshot '{}' has {}",
                self.name,
                self.tables.len(),
                other.name,
                other.tables.len()
            )));
        }
        for (mine, theirs) in self.tables.iter().zip(&other.tables) {
            mine.ensure_same_schema(theirs)?;
        }
        if self.relations != other.relations {
            return Err(DriftError::schema_mismatch(format!(
                "relations of snapshot '{}' differ from snapshot '{}'",
                self.name, other.name
            )));
        }
        Ok(())
    }
}

fn validate_relation(parent: &Table, child: &Table, relation: &Relation) -> Result<()> {
    if relation.parent_columns.is_empty()
        || relation.parent_columns.len() != relation.child_columns.len()
    {
        return Err(DriftError::schema_mismatch(format!(
            "relation '{}' -> '{}' needs equal, non-empty column lists",
            parent.name(),
            child.name()
        )));
    }
    for (&p, &c) in relation.parent_columns.iter().zip(&relation.child_columns) {
        match (parent.columns().get(p), child.columns().get(c)) {
            (Some(pc), Some(cc)) if pc.data_type == cc.data_type => {}
            (Some(pc), Some(cc)) => {
                return Err(DriftError::schema_mismatch(format!(
                    "relation column '{}.{}' ({}) does not match '{}.{}' ({})",
                    parent.name(),
                    pc.name,
                    pc.data_type,
                    child.name(),
                    cc.name,
                    cc.data_type
                )))
            }
            _ => {
                return Err(DriftError::schema_mismatch(format!(
                    "relation '{}' -> '{}' references a missing column",
                    parent.name(),
                    child.name()
                )))
            }
        }
    }
    if let Some(&missing) = parent
        .primary_key()
        .iter()
        .find(|&&k| !relation.parent_columns.contains(&k))
    {
        return Err(DriftError::schema_mismatch(format!(
            "relation '{}' -> '{}' must include parent key column '{}'",
            parent.name(),
            child.name(),
            parent.columns()[missing].name
        )));
    }
    Ok(())
}
