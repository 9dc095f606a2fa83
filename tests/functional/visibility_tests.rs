//! Functional tests for hierarchy restoration and CanHide propagation

use crate::common::snapshots;
use driftdoc::diffgram::cumulative_unchanged;
use driftdoc::html::RowWriter;
use driftdoc::{diff_snapshots, Diffgram, RowState, Value};

fn row_index(diffgram: &Diffgram, level: usize, column: usize, value: &str) -> usize {
    diffgram.tables()[level]
        .rows()
        .iter()
        .position(|r| r.change.value(column) == Some(&Value::from(value)))
        .unwrap_or_else(|| panic!("no row '{}' at level {}", value, level))
}

fn can_hide(diffgram: &Diffgram, level: usize, index: usize) -> bool {
    diffgram.tables()[level].rows()[index].can_hide
}

fn run_profiles(delta_type: &str) -> driftdoc::Snapshot {
    snapshots::three_level(
        &["A", "B"],
        &[("A", "p1", true), ("A", "p2", true), ("B", "q1", true)],
        &[
            ("A", "p1", 1, "Full Import"),
            ("A", "p2", 1, delta_type),
            ("B", "q1", 1, "Export"),
        ],
    )
}

#[test]
fn test_change_deep_in_one_root_blocks_its_whole_subtree() {
    let diffgram = diff_snapshots(&run_profiles("Delta Import"), &run_profiles("Full Sync")).unwrap();

    let a = row_index(&diffgram, 0, 0, "A");
    let b = row_index(&diffgram, 0, 0, "B");
    assert_eq!(diffgram.tables()[0].rows()[a].state(), RowState::Unchanged);
    assert!(!can_hide(&diffgram, 0, a));
    assert!(can_hide(&diffgram, 0, b));

    // unchanged sibling subtree under A inherits "not hideable"
    let p1 = row_index(&diffgram, 1, 1, "p1");
    let p2 = row_index(&diffgram, 1, 1, "p2");
    assert!(!can_hide(&diffgram, 1, p1));
    assert!(!can_hide(&diffgram, 1, p2));
    for &step in diffgram.children(1, p1) {
        assert_eq!(diffgram.tables()[2].rows()[step].state(), RowState::Unchanged);
        assert!(!can_hide(&diffgram, 2, step));
    }
    let modified = diffgram.children(1, p2)[0];
    assert_eq!(diffgram.tables()[2].rows()[modified].state(), RowState::Modified);
    assert!(!can_hide(&diffgram, 2, modified));

    // B's subtree is entirely unchanged
    let q1 = row_index(&diffgram, 1, 1, "q1");
    assert!(can_hide(&diffgram, 1, q1));
    assert!(can_hide(&diffgram, 2, diffgram.children(1, q1)[0]));

    assert!(!diffgram.can_hide());
    assert!(diffgram.has_changes());
}

#[test]
fn test_identical_snapshots_hide_everything() {
    let diffgram = diff_snapshots(&run_profiles("Delta"), &run_profiles("Delta")).unwrap();

    assert!(diffgram.can_hide());
    for table in diffgram.tables() {
        assert!(table.rows().iter().all(|r| r.can_hide));
        assert!(table.rows().iter().all(|r| r.state() == RowState::Unchanged));
    }
}

#[test]
fn test_hierarchy_links_deleted_children() {
    let pilot = snapshots::three_level(&["A"], &[("A", "p1", true)], &[]);
    let production = snapshots::three_level(&["A"], &[("A", "p1", true)], &[("A", "p1", 7, "Export")]);

    let diffgram = diff_snapshots(&pilot, &production).unwrap();
    let p1 = row_index(&diffgram, 1, 1, "p1");
    let children = diffgram.children(1, p1);
    assert_eq!(children.len(), 1);
    assert_eq!(diffgram.tables()[2].rows()[children[0]].state(), RowState::Deleted);
    assert_eq!(diffgram.parent(2, children[0]), Some(p1));
    assert!(!diffgram.can_hide());
}

#[test]
fn test_cumulative_unchanged_is_bottom_up() {
    let diffgram = diff_snapshots(&run_profiles("Delta Import"), &run_profiles("Full Sync")).unwrap();
    let hierarchy = driftdoc::diffgram::Hierarchy::build(diffgram.tables(), diffgram.relations());
    let cumulative = cumulative_unchanged(diffgram.tables(), &hierarchy);

    let a = row_index(&diffgram, 0, 0, "A");
    let b = row_index(&diffgram, 0, 0, "B");
    let p1 = row_index(&diffgram, 1, 1, "p1");
    let p2 = row_index(&diffgram, 1, 1, "p2");
    assert!(!cumulative[0][a]);
    assert!(cumulative[0][b]);
    assert!(cumulative[1][p1]);
    assert!(!cumulative[1][p2]);
}

#[test]
fn test_orphan_rows_are_dropped_everywhere() {
    // partition "orphan" belongs to connector Z, which exists in neither environment
    let pilot = snapshots::three_level(
        &["A"],
        &[("Z", "orphan", true), ("A", "p1", true)],
        &[("Z", "orphan", 1, "Export")],
    );
    let production = snapshots::three_level(
        &["A"],
        &[("Z", "orphan", false), ("A", "p1", true)],
        &[("Z", "orphan", 1, "Import")],
    );

    let diffgram = diff_snapshots(&pilot, &production).unwrap();
    assert_eq!(diffgram.tables()[1].len(), 1);
    assert!(diffgram.tables()[2].is_empty());
    assert!(!diffgram.has_changes());
    assert!(diffgram.can_hide());

    let mut out = String::new();
    RowWriter::new(&diffgram).write_table(&mut out).unwrap();
    assert!(!out.contains("orphan"));
    assert!(out.contains(">p1</td>"));
}

#[test]
fn test_empty_snapshot_pair() {
    let pilot = snapshots::three_level(&[], &[], &[]);
    let diffgram = diff_snapshots(&pilot, &pilot.clone()).unwrap();

    assert!(diffgram.root_rows().is_empty());
    assert!(diffgram.can_hide());
    assert!(!diffgram.has_changes());
}
