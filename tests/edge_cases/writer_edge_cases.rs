//! Edge cases of the row writer

use crate::common::snapshots;
use driftdoc::html::{CellCursor, RowWriter};
use driftdoc::{diff_snapshots, DriftError, LayoutEntry, PrintLayout};

#[test]
fn test_empty_row_slice_is_a_no_op_at_any_level() {
    let snapshot = snapshots::three_level(&["A"], &[("A", "p1", true)], &[]);
    let diffgram = diff_snapshots(&snapshot, &snapshot.clone()).unwrap();
    let writer = RowWriter::new(&diffgram);

    let mut out = String::new();
    let mut cursor = CellCursor::new();
    for level in 0..5 {
        writer.write_rows(&mut out, level, &[], &mut cursor).unwrap();
    }
    assert!(out.is_empty());
    assert!(!cursor.row_open());
}

#[test]
fn test_out_of_range_row_fails_fast() {
    let snapshot = snapshots::connectors(&[("AD", "LDAP")]);
    let diffgram = diff_snapshots(&snapshot, &snapshot.clone()).unwrap();
    let writer = RowWriter::new(&diffgram);

    let mut out = String::new();
    let err = writer
        .write_rows(&mut out, 0, &[4], &mut CellCursor::new())
        .unwrap_err();
    assert!(matches!(err, DriftError::InvalidInput { .. }));
}

#[test]
fn test_leaf_level_alone_has_no_padding() {
    let snapshot = snapshots::connectors(&[("AD", "LDAP")]);
    let diffgram = diff_snapshots(&snapshot, &snapshot.clone()).unwrap();

    let mut out = String::new();
    RowWriter::new(&diffgram).write_table(&mut out).unwrap();
    assert!(!out.contains(">-</td>"));
}

#[test]
fn test_all_columns_hidden_at_a_level() {
    let layout = PrintLayout::from_entries(vec![
        LayoutEntry::new(0, 0).hidden(),
        LayoutEntry::new(1, 1),
        LayoutEntry::new(2, 3),
    ])
    .unwrap();
    let mut snapshot = snapshots::three_level(&["A"], &[("A", "p1", true), ("A", "p2", false)], &[]);
    snapshot.set_layout(layout);
    let diffgram = diff_snapshots(&snapshot, &snapshot.clone()).unwrap();
    let writer = RowWriter::new(&diffgram);
    assert_eq!(writer.max_cells(), 2);

    let mut out = String::new();
    writer.write_table(&mut out).unwrap();
    assert!(out.contains(
        "<tr class=\"Unchanged CanHide\"><td rowspan=\"1\">p1</td><td rowspan=\"1\">-</td></tr>"
    ));
    assert!(out.contains(
        "<tr class=\"Unchanged CanHide\"><td rowspan=\"1\">p2</td><td rowspan=\"1\">-</td></tr>"
    ));
}
