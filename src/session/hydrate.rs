//! Rebuilds a shared, cycle-safe object graph from flat query records.
//!
//! Query results are unordered (node, relationship) tuples that can
//! describe arbitrary cycles. Hydration therefore registers every
//! instance in the identity registry *before* wiring any relationship:
//! when a cyclic traversal reaches a node again, the registry hands back
//! the identity-stable instance instead of recursing or duplicating.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::entity::{EntityKey, EntityRef};
use crate::error::{MappingError, Result};
use crate::model::{Direction, NativeId, NodeRecord, Record, RelationshipRecord};
use crate::schema::{require, Cardinality, RelationshipDef, Schema, TypeSchema};

use super::identity::IdentityRegistry;

/// Instances produced by one hydration pass.
pub(crate) struct HydrationOutcome {
    /// Root-label instances, in first-appearance order.
    pub roots: Vec<EntityRef>,
    /// Instances created by this pass, to be snapshotted by the session.
    pub created: Vec<EntityRef>,
}

pub(crate) struct Hydrator<'a> {
    schema: &'a dyn Schema,
    registry: &'a mut IdentityRegistry,
}

impl<'a> Hydrator<'a> {
    pub fn new(schema: &'a dyn Schema, registry: &'a mut IdentityRegistry) -> Self {
        Self { schema, registry }
    }

    /// Hydrates one result batch rooted at `root_label`.
    ///
    /// Relationship wiring is bounded by `max_depth` hops from the roots;
    /// instances that were already hydrated before this call are linked
    /// regardless, so partial traversal never dangles or duplicates.
    pub fn hydrate(
        &mut self,
        records: &[Record],
        root_label: &str,
        max_depth: usize,
    ) -> Result<HydrationOutcome> {
        let preexisting: FxHashSet<NativeId> = self.registry.ids().collect();

        let mut nodes: Vec<&NodeRecord> = Vec::new();
        let mut relationships: Vec<&RelationshipRecord> = Vec::new();
        for record in records {
            match record {
                Record::Node(node) => nodes.push(node),
                Record::Relationship(rel) => relationships.push(rel),
            }
        }

        let mut roots = Vec::new();
        let mut seen_roots: FxHashSet<EntityKey> = FxHashSet::default();
        let mut created = Vec::new();

        for &node in &nodes {
            let (instance, fresh) = self.materialize(node)?;
            if fresh {
                created.push(instance.clone());
            }
            if node.label == root_label && seen_roots.insert(instance.key()) {
                roots.push(instance);
            }
        }

        let depth = hop_distances(&nodes, &relationships, root_label);
        for &rel in &relationships {
            self.attach_relationship(rel, &depth, max_depth, &preexisting)?;
        }

        Ok(HydrationOutcome { roots, created })
    }

    /// Looks the record up in the registry or allocates a new instance,
    /// registering it by native id before any relationship is populated.
    fn materialize(&mut self, record: &NodeRecord) -> Result<(EntityRef, bool)> {
        let type_schema = require(self.schema, &record.label)?;
        let (instance, fresh) = match record.id {
            Some(id) => {
                if let Some(existing) = self.registry.get(id) {
                    let existing = existing.clone();
                    let existing_label = existing.label();
                    if existing_label != record.label {
                        return Err(MappingError::IdentityConflict {
                            id,
                            existing: existing_label,
                            requested: record.label.clone(),
                        });
                    }
                    (existing, false)
                } else {
                    let instance = type_schema.new_instance();
                    instance.borrow_mut().set_native_id(id);
                    (self.registry.put(id, instance), true)
                }
            }
            // no id yet: a to-be-created entity, never keyed in the registry
            None => (type_schema.new_instance(), true),
        };
        populate_scalars(type_schema, record, &instance)?;
        Ok((instance, fresh))
    }

    fn attach_relationship(
        &self,
        record: &RelationshipRecord,
        depth: &FxHashMap<NativeId, usize>,
        max_depth: usize,
        preexisting: &FxHashSet<NativeId>,
    ) -> Result<()> {
        // normalize so start -> end reads in the outgoing orientation
        let (start_id, end_id) = match record.direction {
            Direction::Incoming => (record.end, record.start),
            _ => (record.start, record.end),
        };
        let undirected = record.direction == Direction::Undirected;

        let Some(start) = self.registry.get(start_id).cloned() else {
            debug!(rel_type = %record.rel_type, id = %start_id, "start node not hydrated; skipping relationship");
            return Ok(());
        };
        let Some(end) = self.registry.get(end_id).cloned() else {
            debug!(rel_type = %record.rel_type, id = %end_id, "end node not hydrated; skipping relationship");
            return Ok(());
        };

        let within_budget = match (depth.get(&start_id), depth.get(&end_id)) {
            (Some(a), Some(b)) => *a.min(b) < max_depth,
            (Some(d), None) | (None, Some(d)) => *d < max_depth,
            (None, None) => false,
        };
        let already_known =
            preexisting.contains(&start_id) && preexisting.contains(&end_id);
        if !within_budget && !already_known {
            debug!(
                rel_type = %record.rel_type,
                start = %start_id,
                end = %end_id,
                "relationship lies beyond the traversal depth; not attached"
            );
            return Ok(());
        }

        let start_label = start.label();
        let end_label = end.label();
        let start_schema = require(self.schema, &start_label)?;
        let end_schema = require(self.schema, &end_label)?;

        let at_start = if undirected {
            Direction::Undirected
        } else {
            Direction::Outgoing
        };
        let at_end = if undirected {
            Direction::Undirected
        } else {
            Direction::Incoming
        };
        let mut start_fields: SmallVec<[&RelationshipDef; 2]> =
            start_schema.matching_relationships(&record.rel_type, at_start);
        start_fields.retain(|def| def.target_label == end_label);
        let mut end_fields: SmallVec<[&RelationshipDef; 2]> =
            end_schema.matching_relationships(&record.rel_type, at_end);
        end_fields.retain(|def| def.target_label == start_label);

        if start_fields.is_empty() && end_fields.is_empty() {
            return Err(MappingError::NoOwningSide {
                rel_type: record.rel_type.clone(),
                start: start_label,
                end: end_label,
            });
        }

        for def in start_fields {
            attach_one(&start, def, &end);
        }
        for def in end_fields {
            attach_one(&end, def, &start);
        }
        Ok(())
    }
}

fn populate_scalars(
    type_schema: &TypeSchema,
    record: &NodeRecord,
    instance: &EntityRef,
) -> Result<()> {
    let mut guard = instance.borrow_mut();
    for (name, value) in &record.properties {
        if *name == type_schema.identifier_field().name {
            // identity always comes from the record's native id
            continue;
        }
        let Some(field) = type_schema.property_field(name) else {
            debug!(label = %record.label, field = %name, "property has no declared field; skipping");
            continue;
        };
        let value = match field.kind {
            Some(kind) => value.clone().coerce(kind, &field.name)?,
            None => value.clone(),
        };
        if !guard.set_property(&field.name, value) {
            debug!(label = %record.label, field = %name, "instance has no backing field; skipping");
        }
    }
    Ok(())
}

fn attach_one(owner: &EntityRef, def: &RelationshipDef, target: &EntityRef) {
    if def.cardinality == Cardinality::Many {
        // re-hydration of the same edge must not duplicate the referent
        let already = owner
            .borrow()
            .related(&def.field)
            .iter()
            .any(|held| held.same_instance(target));
        if already {
            return;
        }
    }
    if !owner.borrow_mut().attach(&def.field, target.clone()) {
        debug!(field = %def.field, "instance has no backing relationship field; skipping");
    }
}

/// Breadth-first hop distance of every node in the batch from the nearest
/// root-label node, over the batch's relationships in either direction.
fn hop_distances(
    nodes: &[&NodeRecord],
    relationships: &[&RelationshipRecord],
    root_label: &str,
) -> FxHashMap<NativeId, usize> {
    let mut adjacency: FxHashMap<NativeId, SmallVec<[NativeId; 4]>> = FxHashMap::default();
    for rel in relationships {
        adjacency.entry(rel.start).or_default().push(rel.end);
        adjacency.entry(rel.end).or_default().push(rel.start);
    }

    let mut distances = FxHashMap::default();
    let mut queue = VecDeque::new();
    for node in nodes {
        if node.label == root_label {
            if let Some(id) = node.id {
                if distances.insert(id, 0).is_none() {
                    queue.push_back(id);
                }
            }
        }
    }
    while let Some(id) = queue.pop_front() {
        let next = distances[&id] + 1;
        if let Some(neighbors) = adjacency.get(&id) {
            for &neighbor in neighbors {
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, next);
                    queue.push_back(neighbor);
                }
            }
        }
    }
    distances
}
