#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use ogma::testkit::GenericEntity;
use ogma::{
    Cardinality, Direction, Entity, EntityRef, NativeId, NodeRecord, Record, RelationshipDef,
    RelationshipRecord, Schema, SchemaRegistry, Session, TypeSchema, ValueKind,
};

/// Typed handle alongside the erased one, for application-style mutation.
pub type Cell = Rc<RefCell<GenericEntity>>;

pub fn session(registry: SchemaRegistry) -> Session {
    Session::new(Rc::new(registry) as Rc<dyn Schema>)
}

/// Person with a name, an integer age, outgoing FRIEND_OF many, a singular
/// outgoing MARRIED_TO, and an undirected COLLEAGUE_OF.
pub fn person_schema() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(
        TypeSchema::new("Person", "id", || {
            EntityRef::new(GenericEntity::new("Person").single("spouse"))
        })
        .property("name")
        .property_as("age", ValueKind::Int)
        .relationship(RelationshipDef::new("friends", "FRIEND_OF", "Person"))
        .relationship(
            RelationshipDef::new("spouse", "MARRIED_TO", "Person").cardinality(Cardinality::One),
        )
        .relationship(
            RelationshipDef::new("colleagues", "COLLEAGUE_OF", "Person")
                .direction(Direction::Undirected),
        ),
    );
    registry
}

/// Person living in a City, cities chained by NEIGHBOR_OF. Used by the
/// depth-limiting scenarios.
pub fn geo_schema() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(
        TypeSchema::new("Person", "id", || {
            EntityRef::new(GenericEntity::new("Person").single("city"))
        })
        .property("name")
        .relationship(
            RelationshipDef::new("city", "LIVES_IN", "City").cardinality(Cardinality::One),
        ),
    );
    registry.register(
        TypeSchema::new("City", "id", || EntityRef::new(GenericEntity::new("City")))
            .property("name")
            .relationship(RelationshipDef::new("neighbors", "NEIGHBOR_OF", "City")),
    );
    registry
}

/// Items linked by the collection-valued field `a`, for the ring fixture.
pub fn ring_schema() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(
        TypeSchema::new("Item", "id", || EntityRef::new(GenericEntity::new("Item")))
            .relationship(RelationshipDef::new("a", "A", "Item")),
    );
    registry
}

pub fn person(id: u64, name: &str) -> Record {
    NodeRecord::new("Person", NativeId(id))
        .property("name", name)
        .into()
}

pub fn node(label: &str, id: u64) -> Record {
    NodeRecord::new(label, NativeId(id)).into()
}

pub fn edge(rel_type: &str, start: u64, end: u64) -> Record {
    RelationshipRecord::new(rel_type, NativeId(start), NativeId(end)).into()
}

pub fn undirected_edge(rel_type: &str, start: u64, end: u64) -> Record {
    RelationshipRecord::new(rel_type, NativeId(start), NativeId(end))
        .direction(Direction::Undirected)
        .into()
}

/// A persisted, typed entity plus its erased handle.
pub fn typed_person(id: u64, name: &str) -> (Cell, EntityRef) {
    let cell = Rc::new(RefCell::new(
        GenericEntity::new("Person").with_property("name", name),
    ));
    cell.borrow_mut().set_native_id(NativeId(id));
    let handle = EntityRef::from_rc(cell.clone());
    (cell, handle)
}

/// True when `owner`'s `field` holds an instance identical to `target`.
pub fn linked_to(owner: &EntityRef, field: &str, target: &EntityRef) -> bool {
    owner
        .borrow()
        .related(field)
        .iter()
        .any(|held| held.same_instance(target))
}

pub fn related_ids(owner: &EntityRef, field: &str) -> Vec<u64> {
    let mut ids: Vec<u64> = owner
        .borrow()
        .related(field)
        .iter()
        .filter_map(|held| held.native_id())
        .map(|id| id.0)
        .collect();
    ids.sort_unstable();
    ids
}
