#![allow(missing_docs)]

mod support;

use ogma::testkit::GenericEntity;
use ogma::{Direction, EdgeOpKind, Entity, NativeId, ReferentId};
use support::*;

#[test]
fn added_referent_emits_one_add_op() {
    let mut session = session(person_schema());
    let roots = session
        .hydrate(&[person(1, "a"), person(2, "b")], "Person", 1)
        .unwrap();
    let a = &roots[0];
    let b = roots[1].clone();

    a.borrow_mut().attach("friends", b);

    let changes = session.changes_for(std::slice::from_ref(a)).unwrap();
    assert!(changes[0].properties.is_empty());
    let ops = &changes[0].edges;
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, EdgeOpKind::Add);
    assert_eq!(ops[0].owner, ReferentId::Persisted(NativeId(1)));
    assert_eq!(ops[0].other, ReferentId::Persisted(NativeId(2)));
    assert_eq!(ops[0].rel_type, "FRIEND_OF");
    assert_eq!(ops[0].direction, Direction::Outgoing);
}

#[test]
fn removed_referent_emits_one_remove_op() {
    let mut session = session(person_schema());
    let (cell, a) = typed_person(1, "a");
    let (_, b) = typed_person(2, "b");
    cell.borrow_mut().attach("friends", b.clone());
    session.register(&a).unwrap();

    cell.borrow_mut().detach("friends", &b);

    let changes = session.changes_for(std::slice::from_ref(&a)).unwrap();
    let ops = &changes[0].edges;
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, EdgeOpKind::Remove);
    assert_eq!(ops[0].owner, ReferentId::Persisted(NativeId(1)));
    assert_eq!(ops[0].other, ReferentId::Persisted(NativeId(2)));
}

#[test]
fn swapping_a_referent_removes_before_adding() {
    let mut session = session(person_schema());
    let (cell, a) = typed_person(1, "a");
    let (_, b) = typed_person(2, "b");
    cell.borrow_mut().attach("friends", b.clone());
    session.register(&a).unwrap();

    cell.borrow_mut().detach("friends", &b);
    let (_, c) = typed_person(3, "c");
    cell.borrow_mut().attach("friends", c);

    let changes = session.changes_for(std::slice::from_ref(&a)).unwrap();
    let ops = &changes[0].edges;
    assert_eq!(ops.len(), 2);
    assert_eq!(
        (ops[0].kind, ops[0].other),
        (EdgeOpKind::Remove, ReferentId::Persisted(NativeId(2)))
    );
    assert_eq!(
        (ops[1].kind, ops[1].other),
        (EdgeOpKind::Add, ReferentId::Persisted(NativeId(3)))
    );
}

#[test]
fn removal_is_scoped_to_the_owning_entity() {
    let mut session = session(person_schema());
    // a <-> b and a <-> c, each side owning its own outgoing edge
    let (cell_a, a) = typed_person(1, "a");
    let (cell_b, b) = typed_person(2, "b");
    let (cell_c, c) = typed_person(3, "c");
    cell_a.borrow_mut().attach("friends", b.clone());
    cell_a.borrow_mut().attach("friends", c.clone());
    cell_b.borrow_mut().attach("friends", a.clone());
    cell_c.borrow_mut().attach("friends", a.clone());
    session.register(&a).unwrap();
    session.register(&b).unwrap();
    session.register(&c).unwrap();

    // application code severs b -> a only
    cell_b.borrow_mut().detach("friends", &a);

    let roots = vec![a.clone(), b.clone(), c.clone()];
    let changes = session.changes_for(&roots).unwrap();
    assert!(changes[0].is_empty(), "a's own relationships are untouched");
    assert!(changes[2].is_empty(), "c's relationships are untouched");

    let b_ops = &changes[1].edges;
    assert_eq!(b_ops.len(), 1);
    assert_eq!(b_ops[0].kind, EdgeOpKind::Remove);
    assert_eq!(b_ops[0].owner, ReferentId::Persisted(NativeId(2)));
    assert_eq!(b_ops[0].other, ReferentId::Persisted(NativeId(1)));

    // a reload against the store state after applying b's removal still
    // shows a linked to c in both directions
    let mut reloaded = support::session(person_schema());
    let after_write = vec![
        person(1, "a"),
        person(2, "b"),
        person(3, "c"),
        edge("FRIEND_OF", 1, 2),
        edge("FRIEND_OF", 1, 3),
        edge("FRIEND_OF", 3, 1),
    ];
    let roots = reloaded.hydrate(&after_write, "Person", 1).unwrap();
    assert_eq!(related_ids(&roots[0], "friends"), [2, 3]);
    assert_eq!(related_ids(&roots[2], "friends"), [1]);
    assert_eq!(related_ids(&roots[1], "friends"), Vec::<u64>::new());
}

#[test]
fn diff_only_covers_declared_relationship_fields() {
    let mut session = session(person_schema());
    let (cell, a) = typed_person(1, "a");
    let (_, b) = typed_person(2, "b");
    // "enemies" is not declared in the schema
    cell.borrow_mut().attach("enemies", b);
    session.register(&a).unwrap();

    let changes = session.changes_for(std::slice::from_ref(&a)).unwrap();
    assert!(
        changes[0].edges.is_empty(),
        "undeclared fields never produce edge operations"
    );
}

#[test]
fn pending_referents_use_placeholders() {
    let mut session = session(person_schema());
    let roots = session
        .hydrate(&[person(1, "a")], "Person", 1)
        .unwrap();
    let a = &roots[0];

    let newcomer = GenericEntity::new("Person").into_ref();
    a.borrow_mut().attach("friends", newcomer.clone());

    let changes = session.changes_for(std::slice::from_ref(a)).unwrap();
    let ops = &changes[0].edges;
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, EdgeOpKind::Add);
    assert_eq!(ops[0].other, ReferentId::Pending(newcomer.key()));
}

#[test]
fn unsaved_owner_uses_a_placeholder_too() {
    let mut session = session(person_schema());
    let draft = GenericEntity::new("Person").into_ref();
    session.register(&draft).unwrap();

    let (_, friend) = typed_person(2, "b");
    draft.borrow_mut().attach("friends", friend);

    let changes = session.changes_for(std::slice::from_ref(&draft)).unwrap();
    let ops = &changes[0].edges;
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].owner, ReferentId::Pending(draft.key()));
    assert_eq!(ops[0].other, ReferentId::Persisted(NativeId(2)));
}
