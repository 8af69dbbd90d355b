//! Schema seam: which fields of an entity type are the identifier, the
//! scalar properties, and the relationships.
//!
//! The engine only ever consumes this interface; how the declarations are
//! produced (derive macros, configuration files, hand-written builders) is
//! outside the core. Lookups are resolved against an instance-scoped
//! registry, never a process-wide cache, so load-scopes stay independent.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::entity::EntityRef;
use crate::error::{MappingError, Result};
use crate::model::{Direction, ValueKind};

/// How many referents a relationship field holds.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cardinality {
    /// A single reference; attaching replaces any prior value.
    One,
    /// An ordered collection; attaching appends.
    Many,
}

/// A declared scalar property field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRef {
    /// Field name, also the property name on the stored node.
    pub name: String,
    /// Declared value kind; when set, hydration coerces into it.
    pub kind: Option<ValueKind>,
}

impl FieldRef {
    /// Declares a field with no conversion.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
        }
    }

    /// Declares a field converted into `kind` at hydration time.
    pub fn with_kind(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
        }
    }
}

/// A declared relationship field on its owning side.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipDef {
    /// Field name on the owning entity.
    pub field: String,
    /// Relationship type in the store.
    pub rel_type: String,
    /// Direction the owning side sees the edge in.
    pub direction: Direction,
    /// Label of the far-side entity type.
    pub target_label: String,
    /// Whether the field holds one referent or many.
    pub cardinality: Cardinality,
}

impl RelationshipDef {
    /// Declares an outgoing, collection-valued relationship field.
    pub fn new(
        field: impl Into<String>,
        rel_type: impl Into<String>,
        target_label: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rel_type: rel_type.into(),
            direction: Direction::Outgoing,
            target_label: target_label.into(),
            cardinality: Cardinality::Many,
        }
    }

    /// Sets the declared direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the declared cardinality.
    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}

/// Factory producing an empty instance of one entity type.
pub type EntityFactory = Box<dyn Fn() -> EntityRef>;

/// Complete mapping declaration for one entity type.
pub struct TypeSchema {
    label: String,
    identifier: FieldRef,
    properties: Vec<FieldRef>,
    relationships: Vec<RelationshipDef>,
    factory: EntityFactory,
}

impl TypeSchema {
    /// Starts a declaration for `label` with the named identifier field
    /// and an instance factory.
    pub fn new(
        label: impl Into<String>,
        identifier: impl Into<String>,
        factory: impl Fn() -> EntityRef + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            identifier: FieldRef::new(identifier),
            properties: Vec::new(),
            relationships: Vec::new(),
            factory: Box::new(factory),
        }
    }

    /// Declares a scalar property field with no conversion.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(FieldRef::new(name));
        self
    }

    /// Declares a scalar property field converted into `kind`.
    pub fn property_as(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.properties.push(FieldRef::with_kind(name, kind));
        self
    }

    /// Declares a relationship field.
    pub fn relationship(mut self, def: RelationshipDef) -> Self {
        self.relationships.push(def);
        self
    }

    /// The label this declaration describes.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The identifier field holding the native id.
    pub fn identifier_field(&self) -> &FieldRef {
        &self.identifier
    }

    /// All declared scalar property fields, in declaration order.
    pub fn property_fields(&self) -> &[FieldRef] {
        &self.properties
    }

    /// All declared relationship fields, in declaration order.
    pub fn relationship_fields(&self) -> &[RelationshipDef] {
        &self.relationships
    }

    /// Looks up a property field by name.
    pub fn property_field(&self, name: &str) -> Option<&FieldRef> {
        self.properties.iter().find(|field| field.name == name)
    }

    /// Looks up a relationship declaration by field name.
    pub fn relationship_for_field(&self, field: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|def| def.field == field)
    }

    /// Relationship fields that accept an edge of `rel_type` presenting at
    /// this side with direction `at`.
    ///
    /// A directed edge presents as `Outgoing` at its start and `Incoming`
    /// at its end; fields declared `Undirected` accept either. An
    /// undirected edge only matches fields declared `Undirected`.
    pub fn matching_relationships(
        &self,
        rel_type: &str,
        at: Direction,
    ) -> SmallVec<[&RelationshipDef; 2]> {
        self.relationships
            .iter()
            .filter(|def| {
                def.rel_type == rel_type
                    && match at {
                        Direction::Outgoing => {
                            matches!(def.direction, Direction::Outgoing | Direction::Undirected)
                        }
                        Direction::Incoming => {
                            matches!(def.direction, Direction::Incoming | Direction::Undirected)
                        }
                        Direction::Undirected => def.direction == Direction::Undirected,
                    }
            })
            .collect()
    }

    /// Allocates a fresh, empty instance of this type.
    pub fn new_instance(&self) -> EntityRef {
        (self.factory)()
    }
}

/// Capability interface the engine consumes; resolved once per label.
pub trait Schema {
    /// Mapping declaration for `label`, if the label is known.
    fn lookup(&self, label: &str) -> Option<&TypeSchema>;
}

/// Looks up `label` or fails fast with [`MappingError::UnknownLabel`].
pub(crate) fn require<'s>(schema: &'s dyn Schema, label: &str) -> Result<&'s TypeSchema> {
    schema
        .lookup(label)
        .ok_or_else(|| MappingError::UnknownLabel(label.to_owned()))
}

/// In-memory [`Schema`] implementation keyed by label.
#[derive(Default)]
pub struct SchemaRegistry {
    types: FxHashMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one type declaration, replacing any prior entry for the
    /// same label.
    pub fn register(&mut self, schema: TypeSchema) {
        let label = schema.label().to_owned();
        if self.types.insert(label.clone(), schema).is_some() {
            debug!(label = %label, "replacing existing schema entry");
        }
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no labels are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Schema for SchemaRegistry {
    fn lookup(&self, label: &str) -> Option<&TypeSchema> {
        self.types.get(label)
    }
}
