//! Functional tests for hierarchical keys

use crate::common::{diff_tables, keys_of, sample_data};
use csvdiff::{ChangeKind, CsvDiffError, DiffOptions, Key};

fn parent_child() -> DiffOptions {
    DiffOptions {
        parent_fields: vec!["order".into()],
        child_fields: vec!["line".into()],
        ..DiffOptions::default()
    }
}

#[test]
fn test_parent_child_key() {
    let left = sample_data::order_lines();
    let right = vec![
        vec!["order", "line", "sku", "qty"],
        vec!["A1", "1", "widget", "3"],
        vec!["A1", "2", "gadget", "1"],
        vec!["B7", "1", "widget", "5"],
        vec!["B7", "2", "gizmo", "1"],
    ];

    let report = diff_tables(&left, &right, &parent_child()).unwrap();
    let updated: Vec<_> = report.entries_of(ChangeKind::Update).collect();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].key, Key::new(["A1", "1"]));
    assert_eq!(updated[0].parent_key, Some(Key::new(["A1"])));

    assert_eq!(keys_of(&report, ChangeKind::Add), vec!["B7 - 2"]);
}

#[test]
fn test_report_orders_by_parent_then_key() {
    let left = vec![vec!["order", "line", "v"]];
    let right = vec![
        vec!["order", "line", "v"],
        vec!["B", "2", "x"],
        vec!["A", "9", "x"],
        vec!["B", "1", "x"],
        vec!["A", "1", "x"],
    ];

    let report = diff_tables(&left, &right, &parent_child()).unwrap();
    let keys: Vec<String> = report.iter().map(|e| e.key.to_string()).collect();
    assert_eq!(keys, vec!["A - 1", "A - 9", "B - 1", "B - 2"]);
}

#[test]
fn test_reparent_under_composite_key_is_add_and_delete() {
    let left = sample_data::order_lines();
    let right = vec![
        vec!["order", "line", "sku", "qty"],
        vec!["A1", "1", "widget", "2"],
        vec!["B7", "1", "widget", "5"],
        vec!["B7", "2", "gadget", "1"],
    ];

    let report = diff_tables(&left, &right, &parent_child()).unwrap();
    assert_eq!(keys_of(&report, ChangeKind::Delete), vec!["A1 - 2"]);
    assert_eq!(keys_of(&report, ChangeKind::Add), vec!["B7 - 2"]);
    assert_eq!(report.summary.moved, 0);
}

#[test]
fn test_reparent_with_key_fields_is_move() {
    let left = vec![
        vec!["dept", "emp", "name"],
        vec!["sales", "e1", "Ann"],
        vec!["sales", "e2", "Bob"],
        vec!["ops", "e3", "Cy"],
    ];
    let right = vec![
        vec!["dept", "emp", "name"],
        vec!["sales", "e1", "Ann"],
        vec!["ops", "e3", "Cy"],
        vec!["ops", "e2", "Bob"],
    ];
    let opts = DiffOptions {
        key_fields: vec!["emp".into()],
        parent_fields: vec!["dept".into()],
        ignore_fields: vec!["dept".into()],
        ..DiffOptions::default()
    };

    let report = diff_tables(&left, &right, &opts).unwrap();
    assert_eq!(keys_of(&report, ChangeKind::Move), vec!["e2"]);
    assert_eq!(report.summary.moved, 1);
    assert_eq!(report.summary.unchanged, 2);

    let moved = report.entries_of(ChangeKind::Move).next().unwrap();
    assert_eq!(moved.parent_key, Some(Key::new(["ops"])));
    assert_eq!(moved.left().and_then(|r| r.parent_key()), Some(&Key::new(["sales"])));
}

#[test]
fn test_sibling_ranks_are_per_parent() {
    let left = vec![
        vec!["dept", "emp"],
        vec!["sales", "e1"],
        vec!["ops", "e2"],
        vec!["sales", "e3"],
    ];
    // Interleaving across parents changes, order within each parent does not
    let right = vec![
        vec!["dept", "emp"],
        vec!["ops", "e2"],
        vec!["sales", "e1"],
        vec!["sales", "e3"],
    ];
    let opts = DiffOptions {
        key_fields: vec!["emp".into()],
        parent_fields: vec!["dept".into()],
        ..DiffOptions::default()
    };

    let report = diff_tables(&left, &right, &opts).unwrap();
    assert_eq!(report.summary.moved, 0);
    assert!(report.is_empty());
}

#[test]
fn test_parent_fields_by_index() {
    let opts = DiffOptions {
        parent_fields: vec![0usize.into()],
        child_fields: vec![1usize.into()],
        ..DiffOptions::default()
    };

    let report = diff_tables(&sample_data::order_lines(), &sample_data::order_lines(), &opts).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.summary.unchanged, 3);
}

#[test]
fn test_unknown_child_field() {
    let opts = DiffOptions {
        parent_fields: vec!["order".into()],
        child_fields: vec!["position".into()],
        ..DiffOptions::default()
    };

    let err = diff_tables(&sample_data::order_lines(), &sample_data::order_lines(), &opts).unwrap_err();
    assert!(matches!(err, CsvDiffError::KeyExtraction { .. }));
    assert!(err.to_string().contains("position"));
}

#[test]
fn test_three_level_tree_lists_parents_first() {
    let left = vec![vec!["id", "parent"]];
    let right = vec![
        vec!["id", "parent"],
        vec!["r", ""],
        vec!["m", "r"],
        vec!["a", "m"],
    ];
    let opts = DiffOptions {
        key_fields: vec!["id".into()],
        parent_fields: vec!["parent".into()],
        ..DiffOptions::default()
    };

    let report = diff_tables(&left, &right, &opts).unwrap();
    let keys: Vec<String> = report.iter().map(|e| e.key.to_string()).collect();
    assert_eq!(keys, vec!["r", "m", "a"]);
}

#[test]
fn test_subtrees_follow_their_parent() {
    let left = vec![vec!["id", "parent", "v"], vec!["root", "", "1"], vec!["c2", "root", "1"]];
    let right = vec![
        vec!["id", "parent", "v"],
        vec!["root", "", "2"],
        vec!["c10", "root", "1"],
        vec!["c2", "root", "2"],
        vec!["c1", "c2", "1"],
    ];
    let opts = DiffOptions {
        key_fields: vec!["id".into()],
        parent_fields: vec!["parent".into()],
        ignore_moves: true,
        ..DiffOptions::default()
    };

    let report = diff_tables(&left, &right, &opts).unwrap();
    let keys: Vec<String> = report.iter().map(|e| e.key.to_string()).collect();
    assert_eq!(keys, vec!["root", "c10", "c2", "c1"]);
}
