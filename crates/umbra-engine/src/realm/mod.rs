//! Realm: shadow storage layered over a host object model
//!
//! A [`Realm`] wraps any [`ObjectModel`] and decorates it:
//!
//! - `store`: per-object hidden field maps, attached under the reserved slot
//! - `gate`: the one-shot protocol that routes a field name through the slot
//! - `reflect`: enumeration and descriptor queries that never reveal the slot,
//!   and lockdown operations that attach a store first
//! - `proxy`: trap wrapping so user traps never see the slot
//! - `handle`: opaque handles, one hidden field name each
//!
//! Reading or writing the reserved slot through [`Realm::get`] and
//! [`Realm::set`] goes through the gate; every other key goes straight to the
//! host. A realm is single-threaded; none of its operations suspend, so
//! nothing can run between staging a field name and consuming it.

mod gate;
mod handle;
mod proxy;
mod reflect;
mod store;

pub use gate::{AccessGate, GateState, PendingField};
pub use handle::OpaqueHandle;
pub use store::{Shadow, ShadowStore};

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};
use umbra_sdk::{ObjectId, ObjectModel, Value};

use crate::error::{ShadowError, ShadowResult};
use crate::heap::Heap;
use crate::ident::reserved_slot_name;
use crate::options::RealmOptions;

/// Result of touching the reserved slot for reading
enum SlotAccess {
    /// A routed read of the staged field
    Field(Value),
    /// Engine-internal access to the object's own store was granted
    Store,
    /// Nothing to hand out
    Sentinel,
}

/// Shadow-storage decorator over a host object model
pub struct Realm<H: ObjectModel = Heap> {
    host: H,
    options: RealmOptions,
    slot: &'static str,
    gate: AccessGate,
    stores: RefCell<FxHashMap<ObjectId, ShadowStore>>,
    handles: RefCell<FxHashSet<ObjectId>>,
    proxies: RefCell<FxHashMap<ObjectId, ObjectId>>,
}

impl Realm {
    /// Realm over a fresh in-memory heap with default options
    pub fn new() -> Self {
        Self::with_host(Heap::new(), RealmOptions::default())
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ObjectModel> Realm<H> {
    /// Wrap an existing host
    pub fn with_host(host: H, options: RealmOptions) -> Self {
        Self {
            host,
            options,
            slot: reserved_slot_name(),
            gate: AccessGate::new(),
            stores: RefCell::new(FxHashMap::default()),
            handles: RefCell::new(FxHashSet::default()),
            proxies: RefCell::new(FxHashMap::default()),
        }
    }

    /// Undecorated host
    ///
    /// Code holding the raw host sees the reserved slot's marker attribute;
    /// it never sees hidden values, which live only in the realm.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Options this realm was built with
    pub fn options(&self) -> &RealmOptions {
        &self.options
    }

    /// The reserved slot name (process-wide constant)
    pub fn reserved_slot_name(&self) -> &'static str {
        self.slot
    }

    /// Current Access Gate state
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Whether a field name is staged on the Access Gate
    pub fn has_pending_field(&self) -> bool {
        self.gate.has_pending()
    }

    /// Stage a field name for the next touch of the reserved slot
    ///
    /// Escape hatch for integrations that route their own keys through
    /// [`Realm::get`]/[`Realm::set`]. With `override_permitted`, the routed
    /// write skips the frozen/non-extensible check.
    pub fn prepare_field_name(&self, name: impl Into<String>, override_permitted: bool) {
        self.gate.prepare(name, override_permitted);
    }

    /// Number of objects carrying a shadow store
    pub fn store_count(&self) -> usize {
        self.stores.borrow().len()
    }

    /// Read an attribute
    ///
    /// For the reserved slot this consumes the staged field name and returns
    /// the hidden value (walking the prototype chain), or `Undefined` when
    /// nothing is staged.
    pub fn get(&self, target: &Value, key: &str) -> ShadowResult<Value> {
        if key == self.slot {
            let object = self.slot_target(target)?;
            return Ok(match self.touch_slot_get(object)? {
                SlotAccess::Field(value) => value,
                SlotAccess::Store | SlotAccess::Sentinel => Value::Undefined,
            });
        }
        let object = self.object_id(target)?;
        Ok(self.host.get(object, key)?)
    }

    /// Write an attribute
    ///
    /// For the reserved slot this consumes the staged field name and writes
    /// the hidden value; with nothing staged the write is ignored.
    pub fn set(&self, target: &Value, key: &str, value: Value) -> ShadowResult<()> {
        if key == self.slot {
            let object = self.slot_target(target)?;
            return self.touch_slot_set(object, value);
        }
        let object = self.object_id(target)?;
        Ok(self.host.set(object, key, value)?)
    }

    /// Own-attribute check
    ///
    /// For the reserved slot this consumes the staged field name and reports
    /// whether the object's own store holds that field; with nothing staged it
    /// reports `false`.
    pub fn has_own_property(&self, target: &Value, key: &str) -> ShadowResult<bool> {
        if key == self.slot {
            let object = self.slot_target(target)?;
            return match self.gate.take_pending() {
                Some(pending) => self.owns_field(object, &pending.name),
                None => Ok(false),
            };
        }
        let object = self.object_id(target)?;
        Ok(self.host.has_own(object, key)?)
    }

    fn object_id(&self, value: &Value) -> ShadowResult<ObjectId> {
        match value {
            Value::Object(id) if self.host.contains(*id) => Ok(*id),
            Value::Object(id) => Err(ShadowError::NotAnObject(format!("dangling object {id}"))),
            other => Err(ShadowError::NotAnObject(other.type_name().to_string())),
        }
    }

    /// Object whose store serves hidden traffic addressed to `value`
    fn store_target(&self, value: &Value) -> ShadowResult<ObjectId> {
        Ok(self.store_owner(self.object_id(value)?))
    }

    /// Store owner for a touch of the reserved slot
    ///
    /// A staged field name never outlives a touch whose target is rejected.
    fn slot_target(&self, value: &Value) -> ShadowResult<ObjectId> {
        self.store_target(value).inspect_err(|_| {
            self.gate.arm();
            if self.gate.take_pending().is_some() {
                trace!("staged field name dropped, invalid slot target");
            }
        })
    }

    fn has_store(&self, object: ObjectId) -> bool {
        self.stores.borrow().contains_key(&object)
    }

    /// Reserved-slot getter
    fn touch_slot_get(&self, object: ObjectId) -> ShadowResult<SlotAccess> {
        if self.has_store(object) {
            if !self.gate.is_armed() {
                self.gate.arm();
                return Ok(SlotAccess::Store);
            }
            return match self.gate.take_pending() {
                Some(pending) => Ok(SlotAccess::Field(
                    self.lookup(object, &pending.name)?.unwrap_or_default(),
                )),
                None => Ok(SlotAccess::Sentinel),
            };
        }

        // Store-less object: behaves like the inherited accessor, which never
        // hands out a store. Engine-internal touches leave the staged name
        // alone; a routed touch during a chain walk consumes it and reads
        // nothing.
        let internal = !self.gate.is_armed();
        self.gate.arm();
        if internal {
            return Ok(SlotAccess::Sentinel);
        }
        let Some(pending) = self.gate.take_pending() else {
            return Ok(SlotAccess::Sentinel);
        };
        if !self.gate.auto_attach() {
            trace!(object = %object, "routed slot read during chain walk");
            return Ok(SlotAccess::Sentinel);
        }
        Ok(SlotAccess::Field(
            self.lookup(object, &pending.name)?.unwrap_or_default(),
        ))
    }

    /// Reserved-slot setter
    fn touch_slot_set(&self, object: ObjectId, value: Value) -> ShadowResult<()> {
        self.gate.arm();
        let Some(pending) = self.gate.take_pending() else {
            trace!(object = %object, "reserved slot write ignored, nothing staged");
            return Ok(());
        };
        if !self.has_store(object) && !self.gate.auto_attach() {
            debug!(object = %object, "hidden field write refused during chain walk");
            return Err(ShadowError::FrozenOrNonExtensible {
                object,
                operation: "set",
            });
        }
        self.write_field(object, &pending.name, value, pending.override_permitted)
    }

    /// Open the gate and touch the slot; true when the object's own store was granted
    fn open_store(&self, object: ObjectId) -> ShadowResult<bool> {
        let _open = self.gate.open();
        Ok(matches!(self.touch_slot_get(object)?, SlotAccess::Store))
    }
}
