//! Common test utilities and helpers

use driftdoc::{ColumnType, DriftError, PrintLayout, Result, Row, Snapshot, Table, Value};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary test environments
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a section definition file
    pub fn write_section(&self, name: &str, section: &serde_json::Value) -> Result<PathBuf> {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(section)?)?;
        Ok(path)
    }

    /// Write a file with raw content
    pub fn write_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root().join(name)).expect("Should be able to read file")
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a driftdoc command rooted at the fixture directory
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use clap::Parser;
        use driftdoc::cli::Cli;
        use driftdoc::commands::execute_command_in;

        let mut cmd_args = vec!["driftdoc"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args).map_err(|e| DriftError::invalid_input(e.to_string()))?;
        execute_command_in(cli.command, cli.config.as_deref(), self.fixture.root())
    }

    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    pub fn expect_failure(&self, args: &[&str]) -> DriftError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Snapshot builders used across the suites
pub mod snapshots {
    use super::*;

    /// Single-table snapshot of connectors `(name, type)`
    pub fn connectors(rows: &[(&str, &str)]) -> Snapshot {
        let mut table = Table::new("Connector");
        table.add_column("Name", ColumnType::String).unwrap();
        table.add_column("Type", ColumnType::String).unwrap();
        table.set_primary_key(&["Name"]).unwrap();
        for (name, kind) in rows {
            table.insert(Row::new(vec![(*name).into(), (*kind).into()])).unwrap();
        }
        let mut snapshot = Snapshot::new("connectors");
        snapshot.set_layout(PrintLayout::all_visible(std::slice::from_ref(&table)));
        snapshot.add_table(table);
        snapshot
    }

    /// Connector -> Partition -> Step hierarchy
    pub fn three_level(
        connectors: &[&str],
        partitions: &[(&str, &str, bool)],
        steps: &[(&str, &str, i64, &str)],
    ) -> Snapshot {
        let mut connector = Table::new("Connector");
        connector.add_column("Name", ColumnType::String).unwrap();
        connector.set_primary_key(&["Name"]).unwrap();
        for name in connectors {
            connector.insert(Row::new(vec![(*name).into()])).unwrap();
        }

        let mut partition = Table::new("Partition");
        partition.add_column("Connector", ColumnType::String).unwrap();
        partition.add_column("Name", ColumnType::String).unwrap();
        partition.add_column("Selected", ColumnType::Boolean).unwrap();
        partition.set_primary_key(&["Connector", "Name"]).unwrap();
        for (c, name, selected) in partitions {
            partition
                .insert(Row::new(vec![(*c).into(), (*name).into(), (*selected).into()]))
                .unwrap();
        }

        let mut step = Table::new("Step");
        step.add_column("Connector", ColumnType::String).unwrap();
        step.add_column("Partition", ColumnType::String).unwrap();
        step.add_column("Number", ColumnType::Integer).unwrap();
        step.add_column("Type", ColumnType::String).unwrap();
        step.set_primary_key(&["Connector", "Partition", "Number"]).unwrap();
        for (c, p, number, kind) in steps {
            step.insert(Row::new(vec![
                (*c).into(),
                (*p).into(),
                Value::Int(*number),
                (*kind).into(),
            ]))
            .unwrap();
        }

        let mut snapshot = Snapshot::new("run-profiles");
        snapshot.add_table(connector);
        snapshot.add_table(partition);
        snapshot.add_table(step);
        snapshot.relate(0, &["Name"], &["Connector"]).unwrap();
        snapshot
            .relate(1, &["Connector", "Name"], &["Connector", "Partition"])
            .unwrap();
        let layout = PrintLayout::all_visible(snapshot.tables());
        snapshot.set_layout(layout);
        snapshot
    }
}

/// Section definition documents
pub mod sample_sections {
    use super::*;

    pub fn connectors(id: &str, pilot_type: &str, production_type: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Connector {}", id),
            "tables": [
                {"name": "Connector",
                 "columns": [{"name": "Name"}, {"name": "Type"}],
                 "primary_key": ["Name"]}
            ],
            "pilot": [[["AD", pilot_type]]],
            "production": [[["AD", production_type]]]
        })
    }

    pub fn partitions() -> serde_json::Value {
        json!({
            "id": "ad/partitions",
            "title": "Partitions",
            "heading_level": 3,
            "tables": [
                {"name": "Connector", "columns": [{"name": "Name"}], "primary_key": ["Name"]},
                {"name": "Partition",
                 "columns": [{"name": "Connector"}, {"name": "Name"}, {"name": "Selected", "type": "boolean"}],
                 "primary_key": ["Connector", "Name"]}
            ],
            "relations": [{"parent_columns": ["Name"], "child_columns": ["Connector"]}],
            "layout": [
                {"table": 0, "column": 0, "sort_order": 0},
                {"table": 1, "column": 0, "hidden": true},
                {"table": 1, "column": 1, "sort_order": 0},
                {"table": 1, "column": 2}
            ],
            "pilot": [
                [["AD"]],
                [["AD", "dc=pilot", true], ["AD", "dc=shared", true]]
            ],
            "production": [
                [["AD"]],
                [["AD", "dc=prod", true], ["AD", "dc=shared", false]]
            ]
        })
    }
}

/// Assertion helpers for test validation
pub mod assertions {
    use std::path::Path;

    /// Assert that a file exists and is not empty
    pub fn assert_file_exists_and_not_empty(path: &Path) {
        assert!(path.exists(), "File should exist: {}", path.display());
        let metadata = std::fs::metadata(path).expect("Should be able to read file metadata");
        assert!(metadata.len() > 0, "File should not be empty: {}", path.display());
    }

    /// Count non-overlapping occurrences of `needle`
    pub fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }
}
