//! Lookups that cross node boundaries: interior descent, sibling links,
//! and ordered iteration over a multi-leaf table.

mod common;

use common::{push_string, ImageBuilder, VarRecord};
use gbfdb::{Database, FieldKind, FieldValue};

fn name_image(key: i64) -> Vec<u8> {
    let mut image = Vec::new();
    push_string(&mut image, &format!("name_{key}"));
    image
}

/// Table "NAMES" (key Id: Long, column Name: String) split over two
/// variable-record leaves under one interior root:
///
///   interior: [(10 -> left), (40 -> right)]
///   left:     10, 20, 30      right: 40, 50
fn names_db() -> Database {
    let mut builder = ImageBuilder::new();
    let master_leaf = builder.alloc();
    let root = builder.alloc();
    let left = builder.alloc();
    let right = builder.alloc();

    let def = common::master_record(
        "NAMES",
        root,
        FieldKind::Long,
        "Id",
        &[(FieldKind::String, "Name")],
    );
    builder.write_var_leaf(master_leaf, -1, -1, &[(0, VarRecord::Inline(&def))]);

    builder.write_interior(root, &[(10, left), (40, right)]);

    let left_images: Vec<(i64, Vec<u8>)> =
        [10, 20, 30].into_iter().map(|k| (k, name_image(k))).collect();
    let left_entries: Vec<(i64, VarRecord)> = left_images
        .iter()
        .map(|(k, v)| (*k, VarRecord::Inline(v.as_slice())))
        .collect();
    builder.write_var_leaf(left, -1, right, &left_entries);

    let right_images: Vec<(i64, Vec<u8>)> =
        [40, 50].into_iter().map(|k| (k, name_image(k))).collect();
    let right_entries: Vec<(i64, VarRecord)> = right_images
        .iter()
        .map(|(k, v)| (*k, VarRecord::Inline(v.as_slice())))
        .collect();
    builder.write_var_leaf(right, left, -1, &right_entries);

    builder.open(master_leaf)
}

#[test]
fn descent_reaches_every_leaf() {
    let db = names_db();
    let view = db.view("NAMES").unwrap().unwrap();

    for key in [10, 20, 30, 40, 50] {
        let record = view.get_at(key).unwrap().unwrap();
        assert_eq!(record.key(), &FieldValue::Long(key));
        assert_eq!(record.get_string(0).unwrap(), format!("name_{key}"));
    }
    assert!(view.get_at(35).unwrap().is_none());
}

#[test]
fn successor_crosses_the_leaf_boundary() {
    let db = names_db();
    let view = db.view("NAMES").unwrap().unwrap();

    // 30 is the last key of the left leaf; its successor lives in the right.
    let record = view.get_after(30).unwrap().unwrap();
    assert_eq!(record.key(), &FieldValue::Long(40));

    assert_eq!(view.get_at_after(35).unwrap().unwrap().key(), &FieldValue::Long(40));
    assert!(view.get_after(50).unwrap().is_none());
}

#[test]
fn predecessor_crosses_the_leaf_boundary() {
    let db = names_db();
    let view = db.view("NAMES").unwrap().unwrap();

    // 40 is the first key of the right leaf; its predecessor is in the left.
    let record = view.get_before(40).unwrap().unwrap();
    assert_eq!(record.key(), &FieldValue::Long(30));

    assert_eq!(view.get_at_before(35).unwrap().unwrap().key(), &FieldValue::Long(30));
    assert!(view.get_before(10).unwrap().is_none());
}

#[test]
fn iteration_spans_all_leaves_in_key_order() {
    let db = names_db();
    let view = db.view("NAMES").unwrap().unwrap();

    let keys: Vec<i64> = view
        .iter_from(i64::MIN)
        .unwrap()
        .map(|r| match r.unwrap().key() {
            FieldValue::Long(k) => *k,
            other => panic!("unexpected key {other:?}"),
        })
        .collect();
    assert_eq!(keys, vec![10, 20, 30, 40, 50]);
}

#[test]
fn iteration_starts_at_the_ceiling_of_its_key() {
    let db = names_db();
    let view = db.view("NAMES").unwrap().unwrap();

    let keys: Vec<i64> = view
        .iter_from(25)
        .unwrap()
        .map(|r| match r.unwrap().key() {
            FieldValue::Long(k) => *k,
            other => panic!("unexpected key {other:?}"),
        })
        .collect();
    assert_eq!(keys, vec![30, 40, 50]);

    assert_eq!(view.iter_from(51).unwrap().count(), 0);
}

#[test]
fn lookups_are_repeatable_on_one_view() {
    let db = names_db();
    let view = db.view("NAMES").unwrap().unwrap();

    let first = view.get_at(20).unwrap().unwrap();
    let second = view.get_at(20).unwrap().unwrap();
    assert_eq!(first.get_string(0).unwrap(), second.get_string(0).unwrap());
}
