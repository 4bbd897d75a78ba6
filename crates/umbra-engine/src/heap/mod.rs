//! Reference host object model
//!
//! An in-memory [`ObjectModel`] for embedders without an object model of their
//! own, and for tests. It follows ES5 attribute semantics:
//!
//! - data attributes with writable/enumerable/configurable flags, kept in
//!   insertion order
//! - single-parent prototype links (`None` for null-prototype objects)
//! - `prevent_extensions`/`seal`/`freeze` and their predicates
//! - proxies whose traps fall through to the target when they return `None`
//!
//! Objects are never collected. Every method borrows the object table only
//! for the duration of a single lookup, so proxy traps may call back into the
//! heap (or into a realm wrapping it) without tripping a `RefCell` borrow.

mod object;

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use umbra_sdk::{
    HostError, HostResult, ObjectId, ObjectModel, PropertyDescriptor, ProxyTraps, Value,
};

use object::{HeapObject, ProxySlot};

/// In-memory object heap
#[derive(Default)]
pub struct Heap {
    objects: RefCell<FxHashMap<ObjectId, HeapObject>>,
}

impl Heap {
    /// Create an empty heap
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects (proxies included)
    pub fn object_count(&self) -> usize {
        self.objects.borrow().len()
    }

    /// Whether the object is a proxy
    pub fn is_proxy(&self, object: ObjectId) -> bool {
        self.objects
            .borrow()
            .get(&object)
            .is_some_and(|o| o.proxy.is_some())
    }

    fn with_object<R>(&self, id: ObjectId, f: impl FnOnce(&HeapObject) -> R) -> HostResult<R> {
        let objects = self.objects.borrow();
        let obj = objects.get(&id).ok_or(HostError::NoSuchObject(id))?;
        Ok(f(obj))
    }

    fn with_object_mut<R>(
        &self,
        id: ObjectId,
        f: impl FnOnce(&mut HeapObject) -> HostResult<R>,
    ) -> HostResult<R> {
        let mut objects = self.objects.borrow_mut();
        let obj = objects.get_mut(&id).ok_or(HostError::NoSuchObject(id))?;
        f(obj)
    }

    /// Proxy target and traps, cloned out so no borrow is held while a trap runs
    fn proxy_of(&self, id: ObjectId) -> HostResult<Option<ProxySlot>> {
        self.with_object(id, |obj| obj.proxy.clone())
    }
}

impl ObjectModel for Heap {
    fn create_object(&self, proto: Option<ObjectId>) -> ObjectId {
        let id = ObjectId::next();
        self.objects.borrow_mut().insert(id, HeapObject::new(proto));
        id
    }

    fn contains(&self, object: ObjectId) -> bool {
        self.objects.borrow().contains_key(&object)
    }

    fn get_prototype_of(&self, object: ObjectId) -> HostResult<Option<ObjectId>> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.get_prototype_of(proxy.target);
        }
        self.with_object(object, |obj| obj.proto)
    }

    fn own_keys(&self, object: ObjectId) -> HostResult<Vec<String>> {
        if let Some(proxy) = self.proxy_of(object)? {
            return match proxy.traps.own_keys(proxy.target) {
                Some(keys) => Ok(keys),
                None => self.own_keys(proxy.target),
            };
        }
        self.with_object(object, |obj| obj.keys().to_vec())
    }

    fn get_own_property(
        &self,
        object: ObjectId,
        key: &str,
    ) -> HostResult<Option<PropertyDescriptor>> {
        if let Some(proxy) = self.proxy_of(object)? {
            return match proxy.traps.get_own_property(proxy.target, key) {
                Some(desc) => Ok(desc),
                None => self.get_own_property(proxy.target, key),
            };
        }
        self.with_object(object, |obj| obj.get(key).cloned())
    }

    fn define_property(
        &self,
        object: ObjectId,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> HostResult<()> {
        if let Some(proxy) = self.proxy_of(object)? {
            return match proxy.traps.define_property(proxy.target, key, &descriptor) {
                Some(()) => Ok(()),
                None => self.define_property(proxy.target, key, descriptor),
            };
        }
        self.with_object_mut(object, |obj| {
            match obj.get(key) {
                Some(existing) if !existing.configurable => {
                    let same_flags = existing.enumerable == descriptor.enumerable
                        && !descriptor.configurable;
                    let value_ok = existing.writable || existing.value == descriptor.value;
                    let writable_ok = existing.writable || !descriptor.writable;
                    if !(same_flags && value_ok && writable_ok) {
                        return Err(HostError::NonConfigurable {
                            object,
                            key: key.to_string(),
                        });
                    }
                }
                Some(_) => {}
                None if !obj.extensible => {
                    return Err(HostError::NotExtensible {
                        object,
                        key: key.to_string(),
                    });
                }
                None => {}
            }
            obj.insert(key, descriptor);
            Ok(())
        })
    }

    fn has_own(&self, object: ObjectId, key: &str) -> HostResult<bool> {
        if let Some(proxy) = self.proxy_of(object)? {
            return match proxy.traps.has(proxy.target, key) {
                Some(found) => Ok(found),
                None => self.has_own(proxy.target, key),
            };
        }
        self.with_object(object, |obj| obj.get(key).is_some())
    }

    fn get(&self, object: ObjectId, key: &str) -> HostResult<Value> {
        if let Some(proxy) = self.proxy_of(object)? {
            return match proxy.traps.get(proxy.target, key) {
                Some(value) => Ok(value),
                None => self.get(proxy.target, key),
            };
        }
        let proto = {
            let objects = self.objects.borrow();
            let obj = objects.get(&object).ok_or(HostError::NoSuchObject(object))?;
            if let Some(desc) = obj.get(key) {
                return Ok(desc.value.clone());
            }
            obj.proto
        };
        match proto {
            Some(parent) => self.get(parent, key),
            None => Ok(Value::Undefined),
        }
    }

    fn set(&self, object: ObjectId, key: &str, value: Value) -> HostResult<()> {
        if let Some(proxy) = self.proxy_of(object)? {
            return match proxy.traps.set(proxy.target, key, &value) {
                Some(()) => Ok(()),
                None => self.set(proxy.target, key, value),
            };
        }
        self.with_object_mut(object, |obj| {
            if let Some(desc) = obj.get_mut(key) {
                if !desc.writable {
                    return Err(HostError::ReadOnly {
                        object,
                        key: key.to_string(),
                    });
                }
                desc.value = value;
                return Ok(());
            }
            if !obj.extensible {
                return Err(HostError::NotExtensible {
                    object,
                    key: key.to_string(),
                });
            }
            obj.insert(key, PropertyDescriptor::data(value));
            Ok(())
        })
    }

    fn delete(&self, object: ObjectId, key: &str) -> HostResult<bool> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.delete(proxy.target, key);
        }
        self.with_object_mut(object, |obj| {
            match obj.get(key).map(|desc| desc.configurable) {
                None => Ok(false),
                Some(false) => Err(HostError::NonConfigurable {
                    object,
                    key: key.to_string(),
                }),
                Some(true) => Ok(obj.remove(key).is_some()),
            }
        })
    }

    fn is_extensible(&self, object: ObjectId) -> HostResult<bool> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.is_extensible(proxy.target);
        }
        self.with_object(object, |obj| obj.extensible)
    }

    fn is_sealed(&self, object: ObjectId) -> HostResult<bool> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.is_sealed(proxy.target);
        }
        self.with_object(object, |obj| obj.is_sealed())
    }

    fn is_frozen(&self, object: ObjectId) -> HostResult<bool> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.is_frozen(proxy.target);
        }
        self.with_object(object, |obj| obj.is_frozen())
    }

    fn prevent_extensions(&self, object: ObjectId) -> HostResult<()> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.prevent_extensions(proxy.target);
        }
        self.with_object_mut(object, |obj| {
            obj.extensible = false;
            Ok(())
        })
    }

    fn seal(&self, object: ObjectId) -> HostResult<()> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.seal(proxy.target);
        }
        self.with_object_mut(object, |obj| {
            obj.seal();
            Ok(())
        })
    }

    fn freeze(&self, object: ObjectId) -> HostResult<()> {
        if let Some(proxy) = self.proxy_of(object)? {
            return self.freeze(proxy.target);
        }
        self.with_object_mut(object, |obj| {
            obj.freeze();
            Ok(())
        })
    }

    fn create_proxy(&self, target: ObjectId, traps: Rc<dyn ProxyTraps>) -> HostResult<ObjectId> {
        if !self.contains(target) {
            return Err(HostError::NoSuchObject(target));
        }
        let id = ObjectId::next();
        self.objects
            .borrow_mut()
            .insert(id, HeapObject::proxy(target, traps));
        Ok(id)
    }
}
