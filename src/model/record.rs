//! Flat query result rows: the unordered (node, relationship) tuples a
//! graph query hands back for hydration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Direction, NativeId, Value};

/// A node row: a label, an optional native id, and a property map.
///
/// A record with no native id describes a to-be-created entity; it is
/// hydrated but never enters the identity registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Label naming the entity type.
    pub label: String,
    /// Store-assigned id, absent for to-be-created entities.
    pub id: Option<NativeId>,
    /// Ordered property name to value mapping.
    pub properties: BTreeMap<String, Value>,
}

impl NodeRecord {
    /// Creates a node record with an empty property map.
    pub fn new(label: impl Into<String>, id: impl Into<Option<NativeId>>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Adds one property to the record.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// A relationship row: a node record's shape plus both endpoint ids and a
/// logical direction relative to the chosen owning side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Relationship type name.
    pub rel_type: String,
    /// Store-assigned id of the relationship itself, if persisted.
    pub id: Option<NativeId>,
    /// Native id of the start node.
    pub start: NativeId,
    /// Native id of the end node.
    pub end: NativeId,
    /// Orientation of the edge relative to the owning side.
    pub direction: Direction,
    /// Properties stored on the relationship itself.
    pub properties: BTreeMap<String, Value>,
}

impl RelationshipRecord {
    /// Creates an outgoing relationship record with no properties.
    pub fn new(rel_type: impl Into<String>, start: NativeId, end: NativeId) -> Self {
        Self {
            rel_type: rel_type.into(),
            id: None,
            start,
            end,
            direction: Direction::Outgoing,
            properties: BTreeMap::new(),
        }
    }

    /// Sets the record's native id.
    pub fn with_id(mut self, id: NativeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the record's logical direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Adds one property to the record.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Either row shape. Hydration consumes an unordered sequence of these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// A node row.
    Node(NodeRecord),
    /// A relationship row.
    Relationship(RelationshipRecord),
}

impl From<NodeRecord> for Record {
    fn from(record: NodeRecord) -> Self {
        Record::Node(record)
    }
}

impl From<RelationshipRecord> for Record {
    fn from(record: RelationshipRecord) -> Self {
        Record::Relationship(record)
    }
}
