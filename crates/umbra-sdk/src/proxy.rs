//! ProxyTraps trait: optional interception layer
//!
//! Every trap has a pass-through default. Returning `None` means the trap is
//! not defined for this call and the host forwards the operation to the
//! proxy's target.

use crate::descriptor::PropertyDescriptor;
use crate::value::{ObjectId, Value};

/// User-supplied trap handler for a proxy object
pub trait ProxyTraps {
    /// Intercept an attribute read
    fn get(&self, target: ObjectId, key: &str) -> Option<Value> {
        let _ = (target, key);
        None
    }

    /// Intercept an attribute write; `Some(())` marks it handled
    fn set(&self, target: ObjectId, key: &str, value: &Value) -> Option<()> {
        let _ = (target, key, value);
        None
    }

    /// Intercept an own-attribute existence check
    fn has(&self, target: ObjectId, key: &str) -> Option<bool> {
        let _ = (target, key);
        None
    }

    /// Intercept an attribute definition; `Some(())` marks it handled
    fn define_property(
        &self,
        target: ObjectId,
        key: &str,
        descriptor: &PropertyDescriptor,
    ) -> Option<()> {
        let _ = (target, key, descriptor);
        None
    }

    /// Intercept an own descriptor query
    fn get_own_property(
        &self,
        target: ObjectId,
        key: &str,
    ) -> Option<Option<PropertyDescriptor>> {
        let _ = (target, key);
        None
    }

    /// Intercept own key enumeration
    fn own_keys(&self, target: ObjectId) -> Option<Vec<String>> {
        let _ = target;
        None
    }
}
