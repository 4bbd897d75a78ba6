//! ObjectModel trait: the host contract
//!
//! Everything shadow storage needs from the host: attribute storage with
//! descriptor flags, prototype links, extensibility and freeze/seal state, and
//! the reflection surface. Implementations are single-threaded and must
//! tolerate re-entrant calls (a proxy trap invoked by one method may call back
//! into another), so methods take `&self` and hosts keep their own interior
//! mutability with short borrows.

use std::rc::Rc;

use crate::descriptor::PropertyDescriptor;
use crate::error::{HostError, HostResult};
use crate::proxy::ProxyTraps;
use crate::value::{ObjectId, Value};

/// Host object model consumed by the shadow-storage engine
pub trait ObjectModel {
    /// Create an ordinary, extensible object with the given prototype
    /// (`None` creates a null-prototype object)
    fn create_object(&self, proto: Option<ObjectId>) -> ObjectId;

    /// Check whether the host knows this object
    fn contains(&self, object: ObjectId) -> bool;

    /// Parent in the prototype chain
    fn get_prototype_of(&self, object: ObjectId) -> HostResult<Option<ObjectId>>;

    /// All own attribute keys, enumerable or not, in insertion order
    fn own_keys(&self, object: ObjectId) -> HostResult<Vec<String>>;

    /// Own attribute descriptor, if present
    fn get_own_property(&self, object: ObjectId, key: &str)
        -> HostResult<Option<PropertyDescriptor>>;

    /// Define or redefine an own attribute
    fn define_property(
        &self,
        object: ObjectId,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> HostResult<()>;

    /// Check for an own attribute
    fn has_own(&self, object: ObjectId, key: &str) -> HostResult<bool> {
        Ok(self.get_own_property(object, key)?.is_some())
    }

    /// Read an attribute, walking the prototype chain
    fn get(&self, object: ObjectId, key: &str) -> HostResult<Value>;

    /// Assign an attribute (creates an own data attribute if missing)
    fn set(&self, object: ObjectId, key: &str, value: Value) -> HostResult<()>;

    /// Delete an own attribute, returning whether one was removed
    fn delete(&self, object: ObjectId, key: &str) -> HostResult<bool>;

    /// Whether new attributes may be added
    fn is_extensible(&self, object: ObjectId) -> HostResult<bool>;

    /// Non-extensible with every own attribute non-configurable
    fn is_sealed(&self, object: ObjectId) -> HostResult<bool>;

    /// Sealed with every own attribute non-writable
    fn is_frozen(&self, object: ObjectId) -> HostResult<bool>;

    /// Forbid new attributes
    fn prevent_extensions(&self, object: ObjectId) -> HostResult<()>;

    /// Forbid new attributes and make existing ones non-configurable
    fn seal(&self, object: ObjectId) -> HostResult<()>;

    /// Seal and make existing attributes non-writable
    fn freeze(&self, object: ObjectId) -> HostResult<()>;

    /// Create a proxy over `target` dispatching to `traps`
    ///
    /// Hosts without an interception layer keep the default.
    fn create_proxy(&self, target: ObjectId, traps: Rc<dyn ProxyTraps>) -> HostResult<ObjectId> {
        let _ = (target, traps);
        Err(HostError::Unsupported("proxy"))
    }

    /// Every own attribute with its descriptor, in key order
    fn get_own_property_descriptors(
        &self,
        object: ObjectId,
    ) -> HostResult<Vec<(String, PropertyDescriptor)>> {
        let mut out = Vec::new();
        for key in self.own_keys(object)? {
            if let Some(desc) = self.get_own_property(object, &key)? {
                out.push((key, desc));
            }
        }
        Ok(out)
    }
}
