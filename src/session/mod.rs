//! Load-scope facade over hydration, identity, and change tracking.
//!
//! One [`Session`] is one logical unit of work. It owns one identity
//! registry and one snapshot register, so identity and change tracking
//! are consistent inside the session and fully isolated across sessions:
//! the same native id hydrated in two sessions yields two independent
//! instances. Everything runs synchronously on the caller's thread;
//! nothing here blocks or suspends.

mod hydrate;
mod identity;
mod snapshot;
mod sync;

pub use identity::IdentityRegistry;
pub use snapshot::{ChangeEvent, Snapshot};
pub use sync::{EdgeOp, EdgeOpKind};

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::entity::{EntityKey, EntityRef};
use crate::error::{MappingError, Result};
use crate::model::{NativeId, Record};
use crate::schema::{require, Schema};

use hydrate::Hydrator;

/// The write shapes produced for one entity: a property-write list and an
/// ordered edge-operation sequence. Exactly what the store write-path
/// consumes, and nothing else.
#[derive(Debug)]
pub struct EntityChanges {
    /// The entity the changes belong to.
    pub entity: EntityRef,
    /// Property writes, one per changed scalar field.
    pub properties: Vec<ChangeEvent>,
    /// Edge additions and removals, removes first per field.
    pub edges: Vec<EdgeOp>,
}

impl EntityChanges {
    /// True when neither properties nor edges changed.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.edges.is_empty()
    }
}

struct TrackedEntity {
    entity: EntityRef,
    snapshot: Snapshot,
}

/// A load-scope: hydrates object graphs and tracks what changed in them.
///
/// Instances move through `UNREGISTERED -> REGISTERED -> DEREGISTERED`;
/// there is no way back from deregistered, and registering such an
/// instance again makes it a brand-new tracked entity with a fresh
/// snapshot.
pub struct Session {
    schema: Rc<dyn Schema>,
    registry: IdentityRegistry,
    tracked: FxHashMap<EntityKey, TrackedEntity>,
}

impl Session {
    /// Opens a session over `schema`.
    pub fn new(schema: Rc<dyn Schema>) -> Self {
        Self {
            schema,
            registry: IdentityRegistry::new(),
            tracked: FxHashMap::default(),
        }
    }

    /// Hydrates one query result batch rooted at `root_label` and returns
    /// the root instances in first-appearance order.
    ///
    /// Every instance created by the batch is registered with this
    /// session, which takes its one-time snapshot. Relationship traversal
    /// is bounded by `max_depth` hops from the roots; `max_depth` is the
    /// only admission-control knob the engine exposes.
    pub fn hydrate(
        &mut self,
        records: &[Record],
        root_label: &str,
        max_depth: usize,
    ) -> Result<Vec<EntityRef>> {
        let outcome =
            Hydrator::new(&*self.schema, &mut self.registry).hydrate(records, root_label, max_depth)?;
        for instance in &outcome.created {
            self.track(instance)?;
        }
        Ok(outcome.roots)
    }

    /// Registers `entity` with this session and takes its snapshot.
    ///
    /// Idempotent: registering an already-registered instance is a no-op.
    /// A persisted entity also enters the identity registry; colliding
    /// with a different instance under the same native id is an error.
    pub fn register(&mut self, entity: &EntityRef) -> Result<()> {
        if self.tracked.contains_key(&entity.key()) {
            debug!(entity = %entity.describe(), "already registered; ignoring");
            return Ok(());
        }
        // validate the label before touching any session state
        require(&*self.schema, &entity.label())?;
        if let Some(id) = entity.native_id() {
            if let Some(existing) = self.registry.get(id) {
                if !existing.same_instance(entity) {
                    return Err(MappingError::IdentityConflict {
                        id,
                        existing: existing.label(),
                        requested: entity.label(),
                    });
                }
            } else {
                self.registry.put(id, entity.clone());
            }
        }
        self.track(entity)
    }

    /// Stops tracking `entity` and discards its snapshot and identity
    /// registration. Registering it again later starts from scratch.
    pub fn deregister(&mut self, entity: &EntityRef) {
        if self.tracked.remove(&entity.key()).is_none() {
            debug!(entity = %entity.describe(), "deregister of untracked instance; ignoring");
        }
        if let Some(id) = entity.native_id() {
            let held = self
                .registry
                .get(id)
                .is_some_and(|existing| existing.same_instance(entity));
            if held {
                self.registry.remove(id);
            }
        }
    }

    /// Computes the property writes and edge operations for each instance.
    ///
    /// Read-only with respect to the live instances; applying the result
    /// and re-baselining (see [`Session::refresh`]) is the caller's
    /// responsibility. Passing an instance that was never registered is a
    /// contract violation and fails with [`MappingError::Unregistered`].
    pub fn changes_for(&self, entities: &[EntityRef]) -> Result<Vec<EntityChanges>> {
        entities
            .iter()
            .map(|entity| self.changes_for_one(entity))
            .collect()
    }

    fn changes_for_one(&self, entity: &EntityRef) -> Result<EntityChanges> {
        let tracked = self
            .tracked
            .get(&entity.key())
            .ok_or_else(|| MappingError::Unregistered(entity.describe()))?;
        let type_schema = require(&*self.schema, &entity.label())?;
        Ok(EntityChanges {
            entity: entity.clone(),
            properties: snapshot::changes_since(entity, &tracked.snapshot, type_schema),
            edges: sync::diff_relationships(entity, &tracked.snapshot, type_schema),
        })
    }

    /// True when `entity` differs from its snapshot in any fingerprint,
    /// including relationship membership hashes.
    pub fn is_dirty(&self, entity: &EntityRef) -> Result<bool> {
        let tracked = self
            .tracked
            .get(&entity.key())
            .ok_or_else(|| MappingError::Unregistered(entity.describe()))?;
        let type_schema = require(&*self.schema, &entity.label())?;
        Ok(!snapshot::is_unchanged(entity, &tracked.snapshot, type_schema))
    }

    /// Re-baselines `entity` with a fresh snapshot, typically after its
    /// changes were successfully written to the store.
    pub fn refresh(&mut self, entity: &EntityRef) -> Result<()> {
        self.deregister(entity);
        self.register(entity)
    }

    /// The instance hydrated under `id` in this session, if any.
    pub fn get(&self, id: NativeId) -> Option<EntityRef> {
        self.registry.get(id).cloned()
    }

    /// True when `entity` is currently tracked by this session.
    pub fn is_registered(&self, entity: &EntityRef) -> bool {
        self.tracked.contains_key(&entity.key())
    }

    /// Number of currently tracked instances.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// All currently tracked instances, in no particular order.
    pub fn tracked_entities(&self) -> impl Iterator<Item = &EntityRef> {
        self.tracked.values().map(|tracked| &tracked.entity)
    }

    /// Ends the load-scope: drops every snapshot and identity entry.
    pub fn clear(&mut self) {
        self.tracked.clear();
        self.registry.clear();
    }

    fn track(&mut self, entity: &EntityRef) -> Result<()> {
        let type_schema = require(&*self.schema, &entity.label())?;
        let snapshot = Snapshot::capture(entity, type_schema);
        self.tracked.insert(
            entity.key(),
            TrackedEntity {
                entity: entity.clone(),
                snapshot,
            },
        );
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tracked", &self.tracked.len())
            .field("identities", &self.registry.len())
            .finish()
    }
}
