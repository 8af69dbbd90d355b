//! Test support: a generic, schema-driven entity implementation.
//!
//! Production domains implement [`Entity`] on their own types; this
//! property-bag variant exists so the engine can be exercised without
//! hand-written domain structs.

use std::collections::BTreeMap;

use crate::entity::{Entity, EntityRef};
use crate::model::{NativeId, Value};

/// Property-bag entity backed by plain maps.
///
/// Scalar fields accept any name. Relationship fields are collection-valued
/// by default; singular fields must be declared up front with
/// [`GenericEntity::single`] so that attaching replaces instead of appends.
#[derive(Debug, Default)]
pub struct GenericEntity {
    label: String,
    id: Option<NativeId>,
    properties: BTreeMap<String, Value>,
    singles: BTreeMap<String, Option<EntityRef>>,
    collections: BTreeMap<String, Vec<EntityRef>>,
}

impl GenericEntity {
    /// Creates an empty entity carrying `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Declares `field` as a singular relationship slot.
    pub fn single(mut self, field: impl Into<String>) -> Self {
        self.singles.insert(field.into(), None);
        self
    }

    /// Builder-style scalar initialization.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Wraps this entity into a shared handle.
    pub fn into_ref(self) -> EntityRef {
        EntityRef::new(self)
    }

    /// Typed scalar write, mirroring what application code does to its own
    /// struct fields.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Removes a scalar field entirely.
    pub fn unset(&mut self, name: &str) {
        self.properties.remove(name);
    }

    /// Detaches one referent from a relationship field by instance
    /// identity. Returns `false` when it was not attached.
    pub fn detach(&mut self, field: &str, target: &EntityRef) -> bool {
        if let Some(slot) = self.singles.get_mut(field) {
            if slot.as_ref().is_some_and(|held| held.same_instance(target)) {
                *slot = None;
                return true;
            }
            return false;
        }
        if let Some(held) = self.collections.get_mut(field) {
            let before = held.len();
            held.retain(|entry| !entry.same_instance(target));
            return held.len() < before;
        }
        false
    }

    /// Empties a relationship field.
    pub fn clear_related(&mut self, field: &str) {
        if let Some(slot) = self.singles.get_mut(field) {
            *slot = None;
        }
        if let Some(held) = self.collections.get_mut(field) {
            held.clear();
        }
    }
}

impl Entity for GenericEntity {
    fn label(&self) -> &str {
        &self.label
    }

    fn native_id(&self) -> Option<NativeId> {
        self.id
    }

    fn set_native_id(&mut self, id: NativeId) {
        self.id = Some(id);
    }

    fn property(&self, field: &str) -> Option<Value> {
        self.properties.get(field).cloned()
    }

    fn set_property(&mut self, field: &str, value: Value) -> bool {
        self.properties.insert(field.to_owned(), value);
        true
    }

    fn related(&self, field: &str) -> Vec<EntityRef> {
        if let Some(slot) = self.singles.get(field) {
            return slot.iter().cloned().collect();
        }
        self.collections.get(field).cloned().unwrap_or_default()
    }

    fn attach(&mut self, field: &str, target: EntityRef) -> bool {
        if let Some(slot) = self.singles.get_mut(field) {
            *slot = Some(target);
            return true;
        }
        self.collections.entry(field.to_owned()).or_default().push(target);
        true
    }
}
