//! Section definition files: the JSON input that describes one report
//! subsection's schema, print layout and pilot/production rows

use crate::config::DEFAULT_CONFIG_FILE;
use crate::diffgram::diff_snapshots;
use crate::error::{DriftError, Result};
use crate::layout::{LayoutEntry, PrintLayout};
use crate::logging::LogContext;
use crate::report::ReportSection;
use crate::snapshot::{ColumnType, Row, Snapshot, Table, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: ColumnType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationSpec {
    pub parent_columns: Vec<String>,
    pub child_columns: Vec<String>,
}

/// A row as written in the file: a bare value array, or values plus a vanity flag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowSpec {
    Values(Vec<Value>),
    Detailed {
        values: Vec<Value>,
        #[serde(default)]
        vanity: bool,
    },
}

impl RowSpec {
    fn to_row(&self) -> Row {
        match self {
            RowSpec::Values(values) => Row::new(values.clone()),
            RowSpec::Detailed { values, vanity } => Row {
                values: values.clone(),
                vanity: *vanity,
            },
        }
    }
}

fn default_heading_level() -> u8 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    pub title: String,
    #[serde(default = "default_heading_level")]
    pub heading_level: u8,
    pub tables: Vec<TableSpec>,
    /// `relations[i]` links table `i` to table `i + 1`
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
    /// When empty, every column is rendered unsorted
    #[serde(default)]
    pub layout: Vec<LayoutEntry>,
    /// One row list per table
    #[serde(default)]
    pub pilot: Vec<Vec<RowSpec>>,
    #[serde(default)]
    pub production: Vec<Vec<RowSpec>>,
}

impl SectionSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DriftError::invalid_section(path, e.to_string()))
    }

    /// Build one environment's snapshot; rows the tables reject are dropped
    pub fn build_snapshot(&self, rows: &[Vec<RowSpec>], ctx: &LogContext) -> Result<Snapshot> {
        if rows.len() > self.tables.len() {
            return Err(DriftError::schema_mismatch(format!(
                "section '{}' has rows for {} tables but defines {}",
                self.id,
                rows.len(),
                self.tables.len()
            )));
        }

        let mut snapshot = Snapshot::new(&self.id);
        for (level, spec) in self.tables.iter().enumerate() {
            let mut table = Table::new(&spec.name);
            for column in &spec.columns {
                table.add_column(&column.name, column.data_type)?;
            }
            let key: Vec<&str> = spec.primary_key.iter().map(String::as_str).collect();
            table.set_primary_key(&key)?;

            let mut dropped = 0;
            for row in rows.get(level).map(Vec::as_slice).unwrap_or(&[]) {
                if !table.add_row(row.to_row(), ctx) {
                    dropped += 1;
                }
            }
            if dropped > 0 {
                ctx.table(&spec.name)
                    .warn(format!("{} rows dropped while loading", dropped));
            }
            snapshot.add_table(table);
        }

        for (level, relation) in self.relations.iter().enumerate() {
            let parent: Vec<&str> = relation.parent_columns.iter().map(String::as_str).collect();
            let child: Vec<&str> = relation.child_columns.iter().map(String::as_str).collect();
            snapshot.relate(level, &parent, &child)?;
        }

        let layout = if self.layout.is_empty() {
            PrintLayout::all_visible(snapshot.tables())
        } else {
            PrintLayout::from_entries(self.layout.iter().cloned())?
        };
        snapshot.set_layout(layout);
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Build both snapshots and diff them into a report section
    pub fn to_report_section(&self) -> Result<ReportSection> {
        let ctx = LogContext::new(&self.id);
        let pilot = self.build_snapshot(&self.pilot, &ctx)?;
        let production = self.build_snapshot(&self.production, &ctx)?;
        let diffgram = diff_snapshots(&pilot, &production)?;
        Ok(ReportSection::new(&self.id, &self.title, diffgram).with_heading_level(self.heading_level))
    }
}

/// Expand input paths into section files. Directories are walked for
/// `*.json` files in sorted order, skipping `driftdoc.json` and
/// `config_file` when it lives inside the walked tree.
pub fn collect_section_files(inputs: &[PathBuf], config_file: Option<&Path>) -> Result<Vec<PathBuf>> {
    let config_file = config_file.and_then(|p| p.canonicalize().ok());
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(DriftError::invalid_input(format!(
                "input does not exist: {}",
                input.display()
            )));
        }

        let mut found: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            let is_json = path.extension().map(|e| e == "json").unwrap_or(false);
            let is_config = path
                .file_name()
                .map(|n| n == DEFAULT_CONFIG_FILE)
                .unwrap_or(false)
                || is_same_file(path, config_file.as_deref());
            if entry.file_type().is_file() && is_json && !is_config {
                found.push(path.to_path_buf());
            }
        }
        if found.is_empty() {
            log::warn!("No section files found in {}", input.display());
        }
        files.extend(found);
    }
    Ok(files)
}

fn is_same_file(path: &Path, canonical: Option<&Path>) -> bool {
    match canonical {
        Some(target) => path.canonicalize().map(|p| p == target).unwrap_or(false),
        None => false,
    }
}
