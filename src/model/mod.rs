//! Wire-level data model shared by hydration and the write path.

mod record;
mod value;

pub use record::{NodeRecord, Record, RelationshipRecord};
pub use value::{Value, ValueKind};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, store-assigned identifier for a node or relationship.
///
/// Unique within the store and stable for the lifetime of the element. A
/// not-yet-persisted entity has no native id (`Option<NativeId>` at rest);
/// the store assigns one on first successful write and it is immutable
/// thereafter.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct NativeId(pub u64);

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NativeId {
    fn from(value: u64) -> Self {
        NativeId(value)
    }
}

/// Logical direction of a relationship, relative to its owning side.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// The owning side is the start of the edge.
    Outgoing,
    /// The owning side is the end of the edge.
    Incoming,
    /// The relationship carries no orientation; either side may own it.
    Undirected,
}
