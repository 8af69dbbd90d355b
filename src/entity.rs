//! Entity handles: shared-ownership references to live instances, with
//! pointer-based identity rather than value equality.
//!
//! Graphs are not trees. Two paths reaching the same node must yield the
//! same in-memory instance, and cycles of any length must be representable,
//! so instances live behind shared, interiorly-mutable handles and are
//! compared by address. Never compare or hash entities by walking their
//! live fields; a cyclic graph makes any recursive equals or hash diverge.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::model::{NativeId, Value};

/// An application object representing one node of the graph.
///
/// Domain types implement this to expose their declared fields to the
/// engine; which fields exist is declared separately by the schema. The
/// engine never discovers fields on its own.
///
/// `attach` must not borrow the target handle: the target of a
/// self-relationship is the entity currently borrowed mutably.
pub trait Entity {
    /// Label naming this entity's type in the schema.
    fn label(&self) -> &str;

    /// The store-assigned id, if this instance has been persisted.
    fn native_id(&self) -> Option<NativeId>;

    /// Records the store-assigned id after a successful first write.
    fn set_native_id(&mut self, id: NativeId);

    /// Current value of a scalar field, `None` when unset.
    fn property(&self, field: &str) -> Option<Value>;

    /// Writes a scalar field. Returns `false` when the instance has no
    /// backing field of that name.
    fn set_property(&mut self, field: &str, value: Value) -> bool;

    /// Current referents of a relationship field, empty when unset.
    fn related(&self, field: &str) -> Vec<EntityRef>;

    /// Attaches a referent to a relationship field: appends for
    /// collection-valued fields, replaces for singular ones. Returns
    /// `false` when the instance has no such field.
    fn attach(&mut self, field: &str, target: EntityRef) -> bool;
}

/// Shared handle to a live entity instance.
///
/// Clones share the same instance; equality and hashing follow instance
/// identity, not field values.
#[derive(Clone)]
pub struct EntityRef(Rc<RefCell<dyn Entity>>);

impl EntityRef {
    /// Wraps a fresh instance into a shared handle.
    pub fn new<E: Entity + 'static>(entity: E) -> Self {
        Self::from_rc(Rc::new(RefCell::new(entity)))
    }

    /// Wraps an existing shared cell. The typed `Rc` and the returned
    /// handle address the same instance, so callers can keep a typed
    /// handle for concrete-type access alongside the erased one.
    pub fn from_rc<E: Entity + 'static>(cell: Rc<RefCell<E>>) -> Self {
        Self(cell)
    }

    /// Address-based identity key, stable while the instance is alive.
    pub fn key(&self) -> EntityKey {
        EntityKey(Rc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// Immutably borrows the instance.
    pub fn borrow(&self) -> Ref<'_, dyn Entity> {
        self.0.borrow()
    }

    /// Mutably borrows the instance.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Entity> {
        self.0.borrow_mut()
    }

    /// The instance's native id, if persisted.
    pub fn native_id(&self) -> Option<NativeId> {
        self.0.borrow().native_id()
    }

    /// The instance's label.
    pub fn label(&self) -> String {
        self.0.borrow().label().to_owned()
    }

    /// Native id when persisted, placeholder key otherwise.
    pub fn referent_id(&self) -> ReferentId {
        match self.native_id() {
            Some(id) => ReferentId::Persisted(id),
            None => ReferentId::Pending(self.key()),
        }
    }

    /// True when both handles address the same instance.
    pub fn same_instance(&self, other: &EntityRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Short human-readable description for logs and error messages.
    pub fn describe(&self) -> String {
        match self.native_id() {
            Some(id) => format!("{}(#{id})", self.label()),
            None => format!("{}(new {})", self.label(), self.key()),
        }
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("label", &self.label())
            .field("id", &self.native_id())
            .finish()
    }
}

/// Address-based identity of a live instance within one load-scope.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EntityKey(usize);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Identifies the far end of a relationship: a persisted native id, or a
/// placeholder key for a not-yet-persisted instance.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ReferentId {
    /// The referent has been written to the store.
    Persisted(NativeId),
    /// The referent exists only in memory; the key is its placeholder.
    Pending(EntityKey),
}

impl fmt::Display for ReferentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferentId::Persisted(id) => write!(f, "#{id}"),
            ReferentId::Pending(key) => write!(f, "new {key}"),
        }
    }
}
