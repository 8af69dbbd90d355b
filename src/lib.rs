#![forbid(unsafe_code)]

//! Session-scoped object-graph mapping engine for property graph stores.
//!
//! The engine does two things. It rebuilds a correctly-shared, cycle-safe
//! object graph from the flat node/relationship records a graph query
//! returns, and it computes a precise delta of field-level and
//! relationship-level changes for an object graph mutated by application
//! code, so that the write path can emit only the changed properties and
//! the added/removed edges.
//!
//! Everything is scoped to a [`Session`]: one session owns one identity
//! registry and one snapshot register, and two sessions hydrating the same
//! native id produce two independent instances. A session is a
//! single-threaded unit of work.

/// Error type and crate-wide result alias.
pub mod error;

/// Wire-level data model: native ids, property values, and query result rows.
pub mod model;

/// Entity handles: shared-ownership instance references and identity keys.
pub mod entity;

/// Stateless query fragments for the load path (paging, sorting, depth).
pub mod query;

/// Schema seam declaring identifiers, properties, and relationships per label.
pub mod schema;

/// Load-scope facade: hydration, identity, snapshots, change computation.
pub mod session;

/// Test support utilities, including a generic property-bag entity.
pub mod testkit;

pub use error::{MappingError, Result};
pub use model::{
    Direction, NativeId, NodeRecord, Record, RelationshipRecord, Value, ValueKind,
};
pub use entity::{Entity, EntityKey, EntityRef, ReferentId};
pub use schema::{
    Cardinality, FieldRef, RelationshipDef, Schema, SchemaRegistry, TypeSchema,
};
pub use session::{
    ChangeEvent, EdgeOp, EdgeOpKind, EntityChanges, IdentityRegistry, Session, Snapshot,
};
