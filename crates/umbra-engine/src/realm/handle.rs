//! Opaque handles
//!
//! A handle is a frozen null-prototype object whose own store holds a single
//! field, `id`, written once at construction. Using a handle as a key resolves to
//! that `id`, which is then used as a field name in the target object's own
//! store. Handles are branded: only objects minted by this realm resolve.

use tracing::debug;
use umbra_sdk::{ObjectId, ObjectModel, Value};

use super::Realm;
use crate::defaults::HANDLE_ID_FIELD;
use crate::error::{ShadowError, ShadowResult};
use crate::ident::new_identifier;

/// A minted handle: one hidden field name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpaqueHandle(ObjectId);

impl OpaqueHandle {
    /// Handle object identity
    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// The handle as a host value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0)
    }
}

impl From<OpaqueHandle> for Value {
    fn from(handle: OpaqueHandle) -> Self {
        handle.to_value()
    }
}

impl<H: ObjectModel> Realm<H> {
    /// Mint a new handle with a fresh identifier
    pub fn create_handle(&self) -> ShadowResult<OpaqueHandle> {
        let object = self.host.create_object(None);
        self.attach_forced(object)?;
        let id = format!("{}{}", self.options.handle_prefix, new_identifier());
        self.write_field(object, HANDLE_ID_FIELD, Value::String(id), true)?;
        self.host.freeze(object)?;
        self.handles.borrow_mut().insert(object);
        debug!(handle = %object, "opaque handle created");
        Ok(OpaqueHandle(object))
    }

    /// Brand check
    pub fn handle_from_value(&self, value: &Value) -> ShadowResult<OpaqueHandle> {
        match value.as_object() {
            Some(id) if self.handles.borrow().contains(&id) => Ok(OpaqueHandle(id)),
            _ => Err(ShadowError::InvalidHandle(value.type_name().to_string())),
        }
    }

    /// The handle's hidden `id`
    pub fn handle_id(&self, handle: OpaqueHandle) -> ShadowResult<String> {
        match self.read_own(handle.0, HANDLE_ID_FIELD)? {
            Some(Value::String(id)) => Ok(id),
            _ => Err(ShadowError::InvalidHandle(handle.0.to_string())),
        }
    }

    /// Key to use in place of the handle
    ///
    /// Stages the handle's `id` as the pending field name and returns the
    /// reserved slot name, so the next [`Realm::get`] or [`Realm::set`] with
    /// that key reaches the handle's field on the target. Only the slot name
    /// leaks, never a value.
    pub fn stringify(&self, handle: OpaqueHandle) -> ShadowResult<&'static str> {
        let id = self.handle_id(handle)?;
        self.gate.prepare(id, false);
        Ok(self.slot)
    }

    /// Read the handle's field on `target` (walking the prototype chain)
    pub fn get_field(&self, target: &Value, handle: &Value) -> ShadowResult<Value> {
        let handle = self.handle_from_value(handle)?;
        self.store_target(target)?;
        let key = self.stringify(handle)?;
        self.get(target, key)
    }

    /// Write the handle's field on `target`
    pub fn set_field(&self, target: &Value, handle: &Value, value: Value) -> ShadowResult<()> {
        let handle = self.handle_from_value(handle)?;
        self.store_target(target)?;
        let key = self.stringify(handle)?;
        self.set(target, key, value)
    }

    /// Remove the handle's field from `target`'s own store
    ///
    /// Returns `false` when the field was never set or `target` has no store.
    pub fn delete_field(&self, target: &Value, handle: &Value) -> ShadowResult<bool> {
        let handle = self.handle_from_value(handle)?;
        let object = self.store_target(target)?;
        if !self.has_store(object) {
            return Ok(false);
        }
        let id = self.handle_id(handle)?;
        self.remove_field(object, &id, true)
    }

    /// Whether `target` or an ancestor holds the handle's field
    pub fn has_field(&self, target: &Value, handle: &Value) -> ShadowResult<bool> {
        let handle = self.handle_from_value(handle)?;
        let object = self.store_target(target)?;
        let id = self.handle_id(handle)?;
        self.contains_field(object, &id)
    }
}
