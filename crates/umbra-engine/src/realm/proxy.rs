//! Proxy shielding
//!
//! User traps are wrapped before the host sees them. For the reserved slot
//! every trap reports "not handled", so the host falls through to the target
//! and user code can neither observe nor spoof hidden-storage traffic. Key
//! enumeration from a user trap is filtered the same way.
//!
//! Hidden fields of a proxy live in its target's store: the realm resolves a
//! proxy to its innermost target before touching any store.

use std::rc::Rc;

use tracing::debug;
use umbra_sdk::{ObjectId, ObjectModel, PropertyDescriptor, ProxyTraps, Value};

use super::Realm;
use crate::error::ShadowResult;

/// User traps with the reserved slot cut out
pub(crate) struct ShieldedTraps {
    slot: &'static str,
    inner: Rc<dyn ProxyTraps>,
}

impl ShieldedTraps {
    pub(crate) fn new(slot: &'static str, inner: Rc<dyn ProxyTraps>) -> Self {
        Self { slot, inner }
    }

    fn shields(&self, key: &str) -> bool {
        key == self.slot
    }
}

impl ProxyTraps for ShieldedTraps {
    fn get(&self, target: ObjectId, key: &str) -> Option<Value> {
        if self.shields(key) {
            return None;
        }
        self.inner.get(target, key)
    }

    fn set(&self, target: ObjectId, key: &str, value: &Value) -> Option<()> {
        if self.shields(key) {
            return None;
        }
        self.inner.set(target, key, value)
    }

    fn has(&self, target: ObjectId, key: &str) -> Option<bool> {
        if self.shields(key) {
            return None;
        }
        self.inner.has(target, key)
    }

    fn define_property(
        &self,
        target: ObjectId,
        key: &str,
        descriptor: &PropertyDescriptor,
    ) -> Option<()> {
        if self.shields(key) {
            return None;
        }
        self.inner.define_property(target, key, descriptor)
    }

    fn get_own_property(
        &self,
        target: ObjectId,
        key: &str,
    ) -> Option<Option<PropertyDescriptor>> {
        if self.shields(key) {
            return None;
        }
        self.inner.get_own_property(target, key)
    }

    fn own_keys(&self, target: ObjectId) -> Option<Vec<String>> {
        let mut keys = self.inner.own_keys(target)?;
        keys.retain(|key| key != self.slot);
        Some(keys)
    }
}

impl<H: ObjectModel> Realm<H> {
    /// Create a proxy over `target` whose traps never see the reserved slot
    pub fn create_proxy(&self, target: &Value, traps: Rc<dyn ProxyTraps>) -> ShadowResult<Value> {
        let target = self.object_id(target)?;
        let shielded: Rc<dyn ProxyTraps> = Rc::new(ShieldedTraps::new(self.slot, traps));
        let proxy = self.host.create_proxy(target, shielded)?;
        self.proxies.borrow_mut().insert(proxy, target);
        debug!(proxy = %proxy, target = %target, "shielded proxy created");
        Ok(Value::Object(proxy))
    }

    /// Whether the object was created by [`Realm::create_proxy`]
    pub fn is_proxy(&self, target: &Value) -> bool {
        target
            .as_object()
            .is_some_and(|id| self.proxies.borrow().contains_key(&id))
    }

    /// Object whose store backs `object`: the innermost proxy target
    pub(super) fn store_owner(&self, object: ObjectId) -> ObjectId {
        let proxies = self.proxies.borrow();
        let mut current = object;
        while let Some(target) = proxies.get(&current) {
            current = *target;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Answers every trap itself and counts slot sightings
    struct Spoofer {
        slot_seen: Cell<usize>,
        slot: &'static str,
    }

    impl Spoofer {
        fn saw(&self, key: &str) {
            if key == self.slot {
                self.slot_seen.set(self.slot_seen.get() + 1);
            }
        }
    }

    impl ProxyTraps for Spoofer {
        fn get(&self, _target: ObjectId, key: &str) -> Option<Value> {
            self.saw(key);
            Some(Value::from("spoofed"))
        }

        fn set(&self, _target: ObjectId, key: &str, _value: &Value) -> Option<()> {
            self.saw(key);
            Some(())
        }

        fn has(&self, _target: ObjectId, key: &str) -> Option<bool> {
            self.saw(key);
            Some(true)
        }

        fn get_own_property(
            &self,
            _target: ObjectId,
            key: &str,
        ) -> Option<Option<PropertyDescriptor>> {
            self.saw(key);
            Some(Some(PropertyDescriptor::data(Value::from("spoofed"))))
        }

        fn own_keys(&self, _target: ObjectId) -> Option<Vec<String>> {
            Some(vec!["x".to_string(), self.slot.to_string()])
        }
    }

    #[test]
    fn test_shield_passes_other_keys() {
        let realm = Realm::new();
        let spoofer = Rc::new(Spoofer {
            slot_seen: Cell::new(0),
            slot: realm.reserved_slot_name(),
        });
        let target = realm.create_object(None).unwrap();
        let proxy = realm.create_proxy(&target, spoofer.clone()).unwrap();

        assert_eq!(realm.get(&proxy, "anything").unwrap(), Value::from("spoofed"));
        assert_eq!(realm.own_keys(&proxy).unwrap(), vec!["x".to_string()]);
        assert_eq!(spoofer.slot_seen.get(), 0);
    }

    #[test]
    fn test_shield_hides_slot_from_traps() {
        let realm = Realm::new();
        let spoofer = Rc::new(Spoofer {
            slot_seen: Cell::new(0),
            slot: realm.reserved_slot_name(),
        });
        let target = realm.create_object(None).unwrap();
        realm.shadow().set(&target, "f", Value::from("real")).unwrap();
        let proxy = realm.create_proxy(&target, spoofer.clone()).unwrap();

        // Hidden traffic through the proxy reaches the target's store
        assert_eq!(realm.shadow().get(&proxy, "f").unwrap(), Some(Value::from("real")));
        realm.shadow().set(&proxy, "g", Value::from(2)).unwrap();
        assert_eq!(realm.shadow().get_own(&target, "g").unwrap(), Some(Value::from(2)));

        let slot = realm.reserved_slot_name();
        realm.prepare_field_name("f", false);
        assert_eq!(realm.get(&proxy, slot).unwrap(), Value::from("real"));

        let id = proxy.as_object().unwrap();
        let marker = realm.host().get_own_property(id, slot).unwrap().unwrap();
        assert_eq!(marker.value, Value::Undefined);
        assert_eq!(spoofer.slot_seen.get(), 0);
    }

    #[test]
    fn test_proxy_creation_does_not_attach() {
        let realm = Realm::new();
        let target = realm.create_object(None).unwrap();
        let before = realm.store_count();
        let proxy = realm
            .create_proxy(&target, Rc::new(Spoofer { slot_seen: Cell::new(0), slot: "" }))
            .unwrap();

        assert!(realm.is_proxy(&proxy));
        assert!(!realm.is_proxy(&target));
        assert_eq!(realm.store_count(), before);
    }

    #[test]
    fn test_nested_proxies_share_target_store() {
        struct Passthrough;
        impl ProxyTraps for Passthrough {}

        let realm = Realm::new();
        let target = realm.create_object(None).unwrap();
        let inner = realm.create_proxy(&target, Rc::new(Passthrough)).unwrap();
        let outer = realm.create_proxy(&inner, Rc::new(Passthrough)).unwrap();

        realm.shadow().set(&outer, "f", Value::from(1)).unwrap();
        assert!(realm.shadow().has_own(&target, "f").unwrap());
        assert!(realm.shadow().has_own(&inner, "f").unwrap());
    }
}
