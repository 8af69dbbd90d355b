//! Per-session register of hydrated instances keyed by native id.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::entity::EntityRef;
use crate::model::NativeId;

/// Enforces the one-instance-per-native-id invariant within a load-scope.
///
/// This map is what makes cyclic hydration terminate: a traversal reaching
/// a node that is currently being populated finds the identity-stable
/// instance here instead of re-entering hydration. Each session owns its
/// own registry; there is deliberately no process-wide cache.
#[derive(Default)]
pub struct IdentityRegistry {
    entries: FxHashMap<NativeId, EntityRef>,
}

impl IdentityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance registered under `id`, if any.
    pub fn get(&self, id: NativeId) -> Option<&EntityRef> {
        self.entries.get(&id)
    }

    /// Registers `entity` under `id`. First registration wins: when the id
    /// is already mapped, the existing instance is kept and returned.
    pub fn put(&mut self, id: NativeId, entity: EntityRef) -> EntityRef {
        use std::collections::hash_map::Entry;
        match self.entries.entry(id) {
            Entry::Occupied(occupied) => {
                debug!(%id, "native id already registered; keeping existing instance");
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => vacant.insert(entity).clone(),
        }
    }

    /// Removes and returns the instance registered under `id`.
    pub fn remove(&mut self, id: NativeId) -> Option<EntityRef> {
        self.entries.remove(&id)
    }

    /// True when `id` has a registered instance.
    pub fn contains(&self, id: NativeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// All currently registered native ids.
    pub fn ids(&self) -> impl Iterator<Item = NativeId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
