//! Translates relationship-field membership changes into edge operations.

use std::collections::BTreeSet;

use crate::entity::{EntityRef, ReferentId};
use crate::model::Direction;
use crate::schema::TypeSchema;

use super::snapshot::Snapshot;

/// Whether an edge is being created or severed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum EdgeOpKind {
    /// Create the edge.
    Add,
    /// Delete the edge.
    Remove,
}

/// One edge mutation, scoped to the owning entity's declared field.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeOp {
    /// Create or delete.
    pub kind: EdgeOpKind,
    /// The owning entity, by native id or placeholder.
    pub owner: ReferentId,
    /// Relationship type of the edge.
    pub rel_type: String,
    /// Declared direction of the owning field.
    pub direction: Direction,
    /// The far-side entity, by native id or placeholder.
    pub other: ReferentId,
}

/// Set-difference between each relationship field's snapshot membership
/// and its live membership.
///
/// Operations are scoped to the owning entity's declared fields; edges
/// owned by unrelated entities are never emitted, even when they point at
/// the same far-side node. Per field, REMOVE operations precede ADD
/// operations so a store enforcing edge uniqueness never observes a
/// transient duplicate.
pub(crate) fn diff_relationships(
    entity: &EntityRef,
    snapshot: &Snapshot,
    type_schema: &TypeSchema,
) -> Vec<EdgeOp> {
    let owner = entity.referent_id();
    let mut ops = Vec::new();
    for def in type_schema.relationship_fields() {
        let live = entity.borrow().related(&def.field);
        let mut live_set = BTreeSet::new();
        // keep first-appearance order for the ADD pass
        let mut live_order = Vec::with_capacity(live.len());
        for referent in &live {
            if live_set.insert(referent.referent_id()) {
                live_order.push(referent.referent_id());
            }
        }

        let empty = BTreeSet::new();
        let baseline = snapshot
            .membership(&def.field)
            .map_or(&empty, |membership| &membership.referents);

        for removed in baseline.difference(&live_set) {
            ops.push(EdgeOp {
                kind: EdgeOpKind::Remove,
                owner,
                rel_type: def.rel_type.clone(),
                direction: def.direction,
                other: *removed,
            });
        }
        for added in &live_order {
            if !baseline.contains(added) {
                ops.push(EdgeOp {
                    kind: EdgeOpKind::Add,
                    owner,
                    rel_type: def.rel_type.clone(),
                    direction: def.direction,
                    other: *added,
                });
            }
        }
    }
    ops
}
