//! Reflection surface of a realm
//!
//! Enumeration and descriptor queries delegate to the host and drop the
//! reserved slot from every result. Lockdown operations attach a store before
//! the host applies the restriction, so hidden fields written earlier stay
//! readable afterwards.

use tracing::debug;
use umbra_sdk::{HostError, ObjectId, ObjectModel, PropertyDescriptor, Value};

use super::Realm;
use crate::error::ShadowResult;

impl<H: ObjectModel> Realm<H> {
    /// Create an object with the given prototype (`None` for a null prototype)
    pub fn create_object(&self, proto: Option<&Value>) -> ShadowResult<Value> {
        let proto = proto.map(|p| self.object_id(p)).transpose()?;
        let object = self.host.create_object(proto);
        if self.options.auto_attach_on_create {
            self.attach_forced(object)?;
        }
        Ok(Value::Object(object))
    }

    /// Own keys in host order, without the reserved slot
    pub fn own_keys(&self, target: &Value) -> ShadowResult<Vec<String>> {
        let object = self.object_id(target)?;
        let mut keys = self.host.own_keys(object)?;
        keys.retain(|key| key != self.slot);
        Ok(keys)
    }

    /// Own enumerable keys
    pub fn keys(&self, target: &Value) -> ShadowResult<Vec<String>> {
        let object = self.object_id(target)?;
        let mut keys = Vec::new();
        for key in self.host.own_keys(object)? {
            if key == self.slot {
                continue;
            }
            if let Some(desc) = self.host.get_own_property(object, &key)? {
                if desc.enumerable {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    /// Own property descriptor; always `None` for the reserved slot
    pub fn get_own_property_descriptor(
        &self,
        target: &Value,
        key: &str,
    ) -> ShadowResult<Option<PropertyDescriptor>> {
        let object = self.object_id(target)?;
        if key == self.slot {
            return Ok(None);
        }
        Ok(self.host.get_own_property(object, key)?)
    }

    /// All own property descriptors in host order, without the reserved slot
    pub fn get_own_property_descriptors(
        &self,
        target: &Value,
    ) -> ShadowResult<Vec<(String, PropertyDescriptor)>> {
        let object = self.object_id(target)?;
        let mut descriptors = self.host.get_own_property_descriptors(object)?;
        descriptors.retain(|(key, _)| key != self.slot);
        Ok(descriptors)
    }

    /// Define an own property
    ///
    /// Redefining the reserved slot is refused as non-configurable.
    pub fn define_property(
        &self,
        target: &Value,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> ShadowResult<()> {
        let object = self.object_id(target)?;
        if key == self.slot {
            return Err(HostError::NonConfigurable {
                object,
                key: key.to_string(),
            }
            .into());
        }
        Ok(self.host.define_property(object, key, descriptor)?)
    }

    /// Delete an own property; the reserved slot is never deleted
    pub fn delete_property(&self, target: &Value, key: &str) -> ShadowResult<bool> {
        let object = self.object_id(target)?;
        if key == self.slot {
            return Ok(false);
        }
        Ok(self.host.delete(object, key)?)
    }

    /// Prototype, or `None` for a null prototype
    pub fn get_prototype_of(&self, target: &Value) -> ShadowResult<Option<Value>> {
        let object = self.object_id(target)?;
        Ok(self.host.get_prototype_of(object)?.map(Value::Object))
    }

    /// Whether new attributes may be added
    pub fn is_extensible(&self, target: &Value) -> ShadowResult<bool> {
        let object = self.object_id(target)?;
        Ok(self.host.is_extensible(object)?)
    }

    /// Host sealed predicate
    pub fn is_sealed(&self, target: &Value) -> ShadowResult<bool> {
        let object = self.object_id(target)?;
        Ok(self.host.is_sealed(object)?)
    }

    /// Host frozen predicate
    pub fn is_frozen(&self, target: &Value) -> ShadowResult<bool> {
        let object = self.object_id(target)?;
        Ok(self.host.is_frozen(object)?)
    }

    /// Forbid new attributes, attaching a store first
    pub fn prevent_extensions(&self, target: &Value) -> ShadowResult<()> {
        let object = self.lock_target(target, "prevent_extensions")?;
        Ok(self.host.prevent_extensions(object)?)
    }

    /// Seal, attaching a store first
    pub fn seal(&self, target: &Value) -> ShadowResult<()> {
        let object = self.lock_target(target, "seal")?;
        Ok(self.host.seal(object)?)
    }

    /// Freeze, attaching a store first
    pub fn freeze(&self, target: &Value) -> ShadowResult<()> {
        let object = self.lock_target(target, "freeze")?;
        Ok(self.host.freeze(object)?)
    }

    fn lock_target(&self, target: &Value, operation: &'static str) -> ShadowResult<ObjectId> {
        let object = self.object_id(target)?;
        let attached = self.attach_forced(self.store_owner(object))?;
        debug!(object = %object, operation, attached, "locking down object");
        Ok(object)
    }
}
