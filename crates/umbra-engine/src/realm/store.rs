//! Shadow Store
//!
//! Each object owns at most one flat map of hidden fields. The map has no
//! inheritance of its own; inherited lookups walk the host's prototype chain
//! explicitly, store by store. Stores are created lazily, never replaced, and
//! live in the realm's side table keyed by object identity. Attaching one
//! also defines the reserved slot on the host object as a non-enumerable,
//! non-writable, non-configurable marker, so the host's extensibility rules
//! decide whether a store can be attached at all.

use rustc_hash::FxHashMap;
use tracing::debug;
use umbra_sdk::{HostError, ObjectId, ObjectModel, PropertyDescriptor, Value};

use super::Realm;
use crate::error::{ShadowError, ShadowResult};

/// Hidden field map owned by exactly one object
#[derive(Debug, Default, Clone)]
pub struct ShadowStore {
    fields: FxHashMap<String, Value>,
}

impl ShadowStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether the field is present (a stored `Undefined` counts)
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Insert or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Remove a field, returning whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        self.fields.remove(name).is_some()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the store holds no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Shadow-store operations of a realm
///
/// Obtained from [`Realm::shadow`]. Field names are plain strings here; opaque
/// handles resolve to such names.
pub struct Shadow<'r, H: ObjectModel> {
    realm: &'r Realm<H>,
}

impl<H: ObjectModel> Shadow<'_, H> {
    /// Attach a store unless one exists; returns whether the object has one
    /// afterwards
    ///
    /// Refused (returns `false`) for a store-less object that is not
    /// extensible, and while a prototype-chain walk is running.
    pub fn attach(&self, target: &Value) -> ShadowResult<bool> {
        let object = self.realm.store_target(target)?;
        self.realm.attach_object(object)
    }

    /// Field value, walking the prototype chain
    pub fn get(&self, target: &Value, name: &str) -> ShadowResult<Option<Value>> {
        let object = self.realm.store_target(target)?;
        self.realm.lookup(object, name)
    }

    /// Whether the field exists on the object or an ancestor
    pub fn has(&self, target: &Value, name: &str) -> ShadowResult<bool> {
        let object = self.realm.store_target(target)?;
        self.realm.contains_field(object, name)
    }

    /// Field value from the object's own store only
    pub fn get_own(&self, target: &Value, name: &str) -> ShadowResult<Option<Value>> {
        let object = self.realm.store_target(target)?;
        self.realm.read_own(object, name)
    }

    /// Whether the object's own store holds the field
    pub fn has_own(&self, target: &Value, name: &str) -> ShadowResult<bool> {
        let object = self.realm.store_target(target)?;
        self.realm.owns_field(object, name)
    }

    /// Number of fields in the object's own store
    pub fn field_count(&self, target: &Value) -> ShadowResult<usize> {
        let object = self.realm.store_target(target)?;
        if !self.realm.open_store(object)? {
            return Ok(0);
        }
        Ok(self.realm.with_store(object, |store| store.len()).unwrap_or(0))
    }

    /// Write a field, refusing frozen targets and new fields on
    /// non-extensible targets
    pub fn set(&self, target: &Value, name: &str, value: Value) -> ShadowResult<()> {
        let object = self.realm.store_target(target)?;
        self.realm.write_field(object, name, value, false)
    }

    /// Write a field regardless of frozen/non-extensible state
    pub fn set_overriding(&self, target: &Value, name: &str, value: Value) -> ShadowResult<()> {
        let object = self.realm.store_target(target)?;
        self.realm.write_field(object, name, value, true)
    }

    /// Delete a field from the object's own store, returning whether it existed
    pub fn delete(&self, target: &Value, name: &str) -> ShadowResult<bool> {
        let object = self.realm.store_target(target)?;
        self.realm.remove_field(object, name, false)
    }

    /// Delete a field regardless of frozen/non-extensible state
    pub fn delete_overriding(&self, target: &Value, name: &str) -> ShadowResult<bool> {
        let object = self.realm.store_target(target)?;
        self.realm.remove_field(object, name, true)
    }
}

impl<H: ObjectModel> Realm<H> {
    /// Shadow-store operations
    pub fn shadow(&self) -> Shadow<'_, H> {
        Shadow { realm: self }
    }

    pub(super) fn with_store<R>(
        &self,
        object: ObjectId,
        f: impl FnOnce(&ShadowStore) -> R,
    ) -> Option<R> {
        self.stores.borrow().get(&object).map(f)
    }

    /// Attach unless a walk is running or the object is not extensible
    pub(super) fn attach_object(&self, object: ObjectId) -> ShadowResult<bool> {
        if self.has_store(object) {
            return Ok(true);
        }
        if !self.gate.auto_attach() {
            return Ok(false);
        }
        self.attach_forced(object)
    }

    /// Attach whenever the host still accepts new attributes
    ///
    /// Used before lockdown operations and at object creation.
    pub(super) fn attach_forced(&self, object: ObjectId) -> ShadowResult<bool> {
        if self.has_store(object) {
            return Ok(true);
        }
        if !self.host.is_extensible(object)? {
            return Ok(false);
        }
        match self
            .host
            .define_property(object, self.slot, PropertyDescriptor::hidden(Value::Undefined))
        {
            Ok(()) => {}
            // Host refused the marker
            Err(HostError::NotExtensible { .. }) => return Ok(false),
            Err(err) => return Err(err.into()),
        }
        self.stores.borrow_mut().insert(object, ShadowStore::new());
        debug!(object = %object, "shadow store attached");
        Ok(true)
    }

    /// Walk the prototype chain for the first store holding `name`
    pub(super) fn lookup(&self, object: ObjectId, name: &str) -> ShadowResult<Option<Value>> {
        let _walk = self.gate.suspend_auto_attach();
        let mut current = Some(object);
        while let Some(id) = current {
            if self.open_store(id)? {
                let found = self
                    .with_store(id, |store| store.get(name).cloned())
                    .flatten();
                if found.is_some() {
                    return Ok(found);
                }
            }
            current = self.host.get_prototype_of(id)?;
        }
        Ok(None)
    }

    pub(super) fn contains_field(&self, object: ObjectId, name: &str) -> ShadowResult<bool> {
        let _walk = self.gate.suspend_auto_attach();
        let mut current = Some(object);
        while let Some(id) = current {
            if self.open_store(id)?
                && self
                    .with_store(id, |store| store.contains(name))
                    .unwrap_or(false)
            {
                return Ok(true);
            }
            current = self.host.get_prototype_of(id)?;
        }
        Ok(false)
    }

    pub(super) fn read_own(&self, object: ObjectId, name: &str) -> ShadowResult<Option<Value>> {
        if !self.open_store(object)? {
            return Ok(None);
        }
        Ok(self
            .with_store(object, |store| store.get(name).cloned())
            .flatten())
    }

    pub(super) fn owns_field(&self, object: ObjectId, name: &str) -> ShadowResult<bool> {
        if !self.open_store(object)? {
            return Ok(false);
        }
        Ok(self
            .with_store(object, |store| store.contains(name))
            .unwrap_or(false))
    }

    /// Whether a mutation of `name` may proceed
    fn permit_change(
        &self,
        object: ObjectId,
        name: &str,
        override_permitted: bool,
    ) -> ShadowResult<bool> {
        if override_permitted {
            return Ok(true);
        }
        if self.host.is_frozen(object)? {
            return Ok(false);
        }
        if !self.host.is_extensible(object)? {
            return self.owns_field(object, name);
        }
        Ok(true)
    }

    pub(super) fn write_field(
        &self,
        object: ObjectId,
        name: &str,
        value: Value,
        override_permitted: bool,
    ) -> ShadowResult<()> {
        if !self.permit_change(object, name, override_permitted)? || !self.attach_object(object)? {
            debug!(object = %object, "hidden field write refused");
            return Err(ShadowError::FrozenOrNonExtensible {
                object,
                operation: "set",
            });
        }
        if self.open_store(object)? {
            if let Some(store) = self.stores.borrow_mut().get_mut(&object) {
                store.insert(name, value);
            }
        }
        Ok(())
    }

    pub(super) fn remove_field(
        &self,
        object: ObjectId,
        name: &str,
        override_permitted: bool,
    ) -> ShadowResult<bool> {
        if !self.permit_change(object, name, override_permitted)? {
            debug!(object = %object, "hidden field delete refused");
            return Err(ShadowError::FrozenOrNonExtensible {
                object,
                operation: "delete",
            });
        }
        if !self.open_store(object)? {
            return Ok(false);
        }
        Ok(self
            .stores
            .borrow_mut()
            .get_mut(&object)
            .is_some_and(|store| store.remove(name)))
    }
}
