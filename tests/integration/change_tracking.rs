#![allow(missing_docs)]

mod support;

use ogma::{Entity, NativeId, Value};
use support::*;

#[test]
fn no_op_round_trip_reports_nothing() {
    let mut session = session(person_schema());
    let records = vec![
        person(1, "a"),
        person(2, "b"),
        edge("FRIEND_OF", 1, 2),
        edge("FRIEND_OF", 2, 1),
    ];

    let roots = session.hydrate(&records, "Person", 1).unwrap();
    let changes = session.changes_for(&roots).unwrap();
    for change in &changes {
        assert!(change.is_empty(), "untouched {:?}", change.entity);
    }
    for root in &roots {
        assert!(!session.is_dirty(root).unwrap());
    }
}

#[test]
fn scalar_change_yields_exactly_one_event() {
    let mut session = session(person_schema());
    let roots = session
        .hydrate(&[person(1, "Mike")], "Person", 1)
        .unwrap();
    let mike = &roots[0];

    mike.borrow_mut().set_property("name", Value::from("Mikael"));

    let changes = session.changes_for(std::slice::from_ref(mike)).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].properties.len(), 1);
    assert_eq!(changes[0].properties[0].field, "name");
    assert_eq!(changes[0].properties[0].value, Some(Value::from("Mikael")));
    assert!(changes[0].edges.is_empty());
}

#[test]
fn value_to_null_and_removal_are_both_changes() {
    let mut session = session(person_schema());
    let (cell, handle) = typed_person(1, "Mike");
    session.register(&handle).unwrap();

    handle.borrow_mut().set_property("name", Value::Null);
    let changes = session.changes_for(std::slice::from_ref(&handle)).unwrap();
    assert_eq!(changes[0].properties.len(), 1);
    assert_eq!(changes[0].properties[0].value, Some(Value::Null));

    cell.borrow_mut().unset("name");
    let changes = session.changes_for(std::slice::from_ref(&handle)).unwrap();
    assert_eq!(changes[0].properties.len(), 1);
    assert_eq!(
        changes[0].properties[0].value, None,
        "an unset field clears the stored property"
    );
}

#[test]
fn never_set_field_stays_quiet() {
    let mut session = session(person_schema());
    // no age on the record, no age on the instance
    let roots = session
        .hydrate(&[person(1, "Mike")], "Person", 1)
        .unwrap();
    let changes = session.changes_for(&roots).unwrap();
    assert!(
        changes[0].is_empty(),
        "null baseline against null live value is not a change"
    );
}

#[test]
fn dirtiness_follows_scalar_mutation_and_reversion() {
    let mut session = session(person_schema());
    let roots = session
        .hydrate(&[person(1, "Mike")], "Person", 1)
        .unwrap();
    let mike = &roots[0];

    assert!(!session.is_dirty(mike).unwrap());
    mike.borrow_mut().set_property("name", Value::from("Mikael"));
    assert!(session.is_dirty(mike).unwrap());
    mike.borrow_mut().set_property("name", Value::from("Mike"));
    assert!(
        !session.is_dirty(mike).unwrap(),
        "reverting restores the baseline"
    );
}

#[test]
fn attaching_a_referent_marks_the_owner_dirty() {
    let mut session = session(person_schema());
    let roots = session
        .hydrate(&[person(1, "a"), person(2, "b")], "Person", 1)
        .unwrap();
    let a = &roots[0];
    let b = roots[1].clone();

    assert!(!session.is_dirty(a).unwrap());
    a.borrow_mut().attach("friends", b);
    assert!(session.is_dirty(a).unwrap());
}

#[test]
fn cleared_and_refilled_membership_reads_as_unchanged() {
    let mut session = session(person_schema());
    let (cell, handle) = typed_person(1, "a");
    let (_, b) = typed_person(2, "b");
    let (_, c) = typed_person(3, "c");
    cell.borrow_mut().attach("friends", b.clone());
    cell.borrow_mut().attach("friends", c.clone());
    session.register(&handle).unwrap();

    cell.borrow_mut().clear_related("friends");
    assert!(session.is_dirty(&handle).unwrap(), "emptied is a real change");

    // refill with identical membership, in a different order
    cell.borrow_mut().attach("friends", c);
    cell.borrow_mut().attach("friends", b);

    // membership hashing is deliberately coarse: identical membership is
    // indistinguishable from never having been touched
    assert!(!session.is_dirty(&handle).unwrap());
    let changes = session.changes_for(std::slice::from_ref(&handle)).unwrap();
    assert!(changes[0].edges.is_empty());
}

#[test]
fn refresh_rebaselines_after_a_write() {
    let mut session = session(person_schema());
    let roots = session
        .hydrate(&[person(1, "Mike")], "Person", 1)
        .unwrap();
    let mike = &roots[0];

    mike.borrow_mut().set_property("name", Value::from("Mikael"));
    assert!(session.is_dirty(mike).unwrap());

    session.refresh(mike).unwrap();
    assert!(!session.is_dirty(mike).unwrap());
    let changes = session.changes_for(std::slice::from_ref(mike)).unwrap();
    assert!(changes[0].is_empty());
    assert_eq!(
        session.get(NativeId(1)).unwrap().key(),
        mike.key(),
        "refresh keeps the identity registration"
    );
}
