//! Edge cases of section definition input

use crate::common::{sample_sections, TestFixture};
use driftdoc::section::{collect_section_files, SectionSpec};
use driftdoc::{DriftError, LogContext, RowState};
use serde_json::json;

#[test]
fn test_malformed_section_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.write_raw("broken.json", "{ \"id\": ").unwrap();

    let err = SectionSpec::load(&path).unwrap_err();
    assert!(matches!(err, DriftError::InvalidSection { .. }));
}

#[test]
fn test_rejected_rows_are_dropped_not_fatal() {
    let section: SectionSpec = serde_json::from_value(json!({
        "id": "connectors",
        "title": "Connectors",
        "tables": [
            {"name": "Connector",
             "columns": [{"name": "Name"}, {"name": "Rank", "type": "integer"}],
             "primary_key": ["Name"]}
        ],
        "pilot": [[
            ["AD", 1],
            ["AD", 2],
            [null, 3],
            ["SQL", "high"],
            ["LDAP"],
            ["HR", null]
        ]],
        "production": [[["AD", 1]]]
    }))
    .unwrap();

    let snapshot = section
        .build_snapshot(&section.pilot, &LogContext::new("connectors"))
        .unwrap();
    assert_eq!(snapshot.table(0).unwrap().len(), 2);

    let report_section = section.to_report_section().unwrap();
    let table = report_section.diffgram.table(0).unwrap();
    assert_eq!(table.rows_in_state(RowState::Unchanged).count(), 1);
    assert_eq!(table.rows_in_state(RowState::Added).count(), 1);
}

#[test]
fn test_missing_relation_is_an_error() {
    let mut section = sample_sections::partitions();
    section["relations"] = json!([]);
    let section: SectionSpec = serde_json::from_value(section).unwrap();

    let err = section.to_report_section().unwrap_err();
    assert!(matches!(err, DriftError::SchemaMismatch { .. }));
}

#[test]
fn test_relation_to_unknown_column() {
    let mut section = sample_sections::partitions();
    section["relations"] = json!([{"parent_columns": ["Name"], "child_columns": ["Host"]}]);
    let section: SectionSpec = serde_json::from_value(section).unwrap();

    assert!(section.to_report_section().is_err());
}

#[test]
fn test_bookmark_and_jump_on_same_column() {
    let mut section = sample_sections::partitions();
    section["layout"] = json!([{"table": 0, "column": 0, "bookmark": 0, "jump_to_bookmark": 0}]);
    let section: SectionSpec = serde_json::from_value(section).unwrap();

    let err = section.to_report_section().unwrap_err();
    assert!(matches!(err, DriftError::Layout { .. }));
}

#[test]
fn test_missing_row_lists_mean_empty_tables() {
    let mut section = sample_sections::partitions();
    section["production"] = json!([]);
    let section: SectionSpec = serde_json::from_value(section).unwrap();

    let report_section = section.to_report_section().unwrap();
    let counts = report_section.diffgram.counts();
    assert_eq!(counts[0].1.added, 1);
    assert_eq!(counts[1].1.added, 2);
    assert!(!report_section.diffgram.can_hide());
}

#[test]
fn test_collect_skips_config_and_other_files() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .write_section("sections/b.json", &sample_sections::connectors("b", "x", "x"))
        .unwrap();
    fixture
        .write_section("sections/a.json", &sample_sections::connectors("a", "x", "x"))
        .unwrap();
    fixture
        .write_section("sections/nested/c.json", &sample_sections::connectors("c", "x", "x"))
        .unwrap();
    fixture.write_raw("sections/notes.txt", "not a section").unwrap();
    fixture.write_raw("sections/driftdoc.json", "{}").unwrap();

    let files = collect_section_files(&[fixture.root().join("sections")], None).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(fixture.root()).unwrap().display().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["sections/a.json", "sections/b.json", "sections/nested/c.json"]
    );
}

#[test]
fn test_collect_skips_named_config_file() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .write_section("sections/a.json", &sample_sections::connectors("a", "x", "x"))
        .unwrap();
    let config = fixture.write_raw("sections/lab.json", "{}").unwrap();

    let files = collect_section_files(&[fixture.root().join("sections")], Some(&config)).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("a.json"));

    let files = collect_section_files(&[fixture.root().join("sections")], None).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
fn test_collect_missing_input() {
    let fixture = TestFixture::new().unwrap();
    let err = collect_section_files(&[fixture.root().join("missing")], None).unwrap_err();
    assert!(matches!(err, DriftError::InvalidInput { .. }));
}
