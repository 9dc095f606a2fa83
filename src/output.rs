//! Console output for diff summaries

use crate::change_detection::DiffCounts;
use crate::error::Result;
use crate::report::ReportSection;
use serde::{Deserialize, Serialize};

/// Row counts of one table within a section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub table: String,
    #[serde(flatten)]
    pub counts: DiffCounts,
}

/// Change overview of one report section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    pub id: String,
    pub title: String,
    pub changed: bool,
    pub tables: Vec<TableSummary>,
}

impl SectionSummary {
    pub fn from_section(section: &ReportSection) -> Self {
        let tables = section
            .diffgram
            .counts()
            .into_iter()
            .map(|(table, counts)| TableSummary { table, counts })
            .collect();
        Self {
            id: section.id.clone(),
            title: section.title.clone(),
            changed: !section.diffgram.can_hide(),
            tables,
        }
    }
}

/// Pretty printer for driftdoc output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print section summaries as a tree
    pub fn print_summaries(summaries: &[SectionSummary]) {
        if summaries.is_empty() {
            println!("No sections found.");
            return;
        }

        let changed = summaries.iter().filter(|s| s.changed).count();
        println!("🔍 Drift summary: {} of {} sections changed", changed, summaries.len());
        for (i, summary) in summaries.iter().enumerate() {
            let last = i == summaries.len() - 1;
            let prefix = if last { "└─" } else { "├─" };
            let marker = if summary.changed { "❌" } else { "✅" };
            println!("{} {} {} ({})", prefix, marker, summary.title, summary.id);

            let indent = if last { "   " } else { "│  " };
            for (j, table) in summary.tables.iter().enumerate() {
                let table_prefix = if j == summary.tables.len() - 1 { "└─" } else { "├─" };
                println!(
                    "{}{} {}: {}",
                    indent,
                    table_prefix,
                    table.table,
                    format_counts(&table.counts)
                );
            }
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// One-line rendering of row counts, omitting zero change counts
pub fn format_counts(counts: &DiffCounts) -> String {
    if !counts.has_changes() {
        return format!("{} unchanged", counts.unchanged);
    }
    let mut parts = Vec::new();
    if counts.modified > 0 {
        parts.push(format!("{} modified", counts.modified));
    }
    if counts.added > 0 {
        parts.push(format!("{} added", counts.added));
    }
    if counts.deleted > 0 {
        parts.push(format!("{} deleted", counts.deleted));
    }
    parts.push(format!("{} unchanged", counts.unchanged));
    parts.join(", ")
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
