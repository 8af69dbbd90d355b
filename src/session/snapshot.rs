//! Point-in-time field fingerprints used for change detection.
//!
//! Scalar fields fingerprint as their value. Collection-valued
//! relationship fields fingerprint as an order-independent hash over the
//! referents' native ids, not a deep structural copy: membership changes
//! are detected exactly, while in-place mutation of elements already
//! present is invisible at this layer. A collection emptied and refilled
//! with identical membership therefore reads as unchanged; that
//! imprecision is part of the contract, not a defect to fix with a full
//! structural diff.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::entity::{EntityRef, ReferentId};
use crate::model::Value;
use crate::schema::TypeSchema;

/// A single property write: the field differs from its snapshot and
/// `value` must be sent to the store (`None` clears the property).
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    /// Declared field name.
    pub field: String,
    /// Current live value.
    pub value: Option<Value>,
}

/// Fingerprint of one relationship field's membership.
#[derive(Clone, Debug)]
pub(crate) struct Membership {
    pub hash: u64,
    pub referents: BTreeSet<ReferentId>,
}

/// Immutable field-to-fingerprint baseline for one entity instance.
///
/// Captured exactly once, when the instance is registered with its
/// session; recomputing changes always compares the current live fields
/// against this one fixed baseline.
#[derive(Clone, Debug)]
pub struct Snapshot {
    scalars: BTreeMap<String, Option<Value>>,
    memberships: BTreeMap<String, Membership>,
}

/// Hash contribution of a single referent. Not-yet-persisted referents
/// all contribute the same sentinel; the exact referent set kept alongside
/// the hash is what distinguishes them.
pub(crate) fn referent_hash(referent: &ReferentId) -> u64 {
    const PENDING_SENTINEL: u64 = 0x7472616e7369656e;
    match referent {
        ReferentId::Persisted(id) => {
            let mut hasher = SipHasher13::new_with_keys(0, 0);
            hasher.write_u64(id.0);
            hasher.finish()
        }
        ReferentId::Pending(_) => PENDING_SENTINEL,
    }
}

/// Order-independent hash over a relationship field's membership.
pub(crate) fn membership_hash<'a>(referents: impl Iterator<Item = &'a ReferentId>) -> u64 {
    referents.fold(0u64, |acc, referent| {
        acc.wrapping_add(referent_hash(referent))
    })
}

fn live_referents(entity: &EntityRef, field: &str) -> BTreeSet<ReferentId> {
    entity
        .borrow()
        .related(field)
        .iter()
        .map(EntityRef::referent_id)
        .collect()
}

impl Snapshot {
    /// Captures the current fingerprint of every declared field.
    pub(crate) fn capture(entity: &EntityRef, type_schema: &TypeSchema) -> Snapshot {
        let mut scalars = BTreeMap::new();
        {
            let guard = entity.borrow();
            for field in type_schema.property_fields() {
                scalars.insert(field.name.clone(), guard.property(&field.name));
            }
        }
        let mut memberships = BTreeMap::new();
        for def in type_schema.relationship_fields() {
            let referents = live_referents(entity, &def.field);
            let hash = membership_hash(referents.iter());
            memberships.insert(def.field.clone(), Membership { hash, referents });
        }
        Snapshot {
            scalars,
            memberships,
        }
    }

    pub(crate) fn scalar(&self, field: &str) -> Option<&Option<Value>> {
        self.scalars.get(field)
    }

    pub(crate) fn membership(&self, field: &str) -> Option<&Membership> {
        self.memberships.get(field)
    }
}

/// Property writes needed to bring the store in line with the live
/// instance. Relationship fields are not reported here; their membership
/// changes surface as edge operations instead.
pub(crate) fn changes_since(
    entity: &EntityRef,
    snapshot: &Snapshot,
    type_schema: &TypeSchema,
) -> Vec<ChangeEvent> {
    let guard = entity.borrow();
    let mut events = Vec::new();
    for field in type_schema.property_fields() {
        let current = guard.property(&field.name);
        match snapshot.scalar(&field.name) {
            Some(baseline) => {
                if baseline.is_none() && current.is_none() {
                    continue;
                }
                if *baseline != current {
                    events.push(ChangeEvent {
                        field: field.name.clone(),
                        value: current,
                    });
                }
            }
            // The snapshot predates this field declaration; over-report
            // rather than silently drop a write.
            None => events.push(ChangeEvent {
                field: field.name.clone(),
                value: current,
            }),
        }
    }
    events
}

/// Full fingerprint comparison across every declared field, including
/// relationship membership hashes.
pub(crate) fn is_unchanged(
    entity: &EntityRef,
    snapshot: &Snapshot,
    type_schema: &TypeSchema,
) -> bool {
    {
        let guard = entity.borrow();
        for field in type_schema.property_fields() {
            let current = guard.property(&field.name);
            match snapshot.scalar(&field.name) {
                Some(baseline) => {
                    if baseline.is_none() && current.is_none() {
                        continue;
                    }
                    if *baseline != current {
                        return false;
                    }
                }
                None => return false,
            }
        }
    }
    for def in type_schema.relationship_fields() {
        let live = live_referents(entity, &def.field);
        let current = membership_hash(live.iter());
        match snapshot.membership(&def.field) {
            Some(membership) => {
                if membership.hash != current {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}
