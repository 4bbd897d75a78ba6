//! Object records held by the reference heap

use std::rc::Rc;

use rustc_hash::FxHashMap;
use umbra_sdk::{ObjectId, PropertyDescriptor, ProxyTraps};

/// Proxy target and trap handler
#[derive(Clone)]
pub(crate) struct ProxySlot {
    pub target: ObjectId,
    pub traps: Rc<dyn ProxyTraps>,
}

/// Heap-allocated object: ordered attributes, prototype link, extensibility
pub(crate) struct HeapObject {
    pub proto: Option<ObjectId>,
    pub extensible: bool,
    keys: Vec<String>,
    props: FxHashMap<String, PropertyDescriptor>,
    pub proxy: Option<ProxySlot>,
}

impl HeapObject {
    pub fn new(proto: Option<ObjectId>) -> Self {
        Self {
            proto,
            extensible: true,
            keys: Vec::new(),
            props: FxHashMap::default(),
            proxy: None,
        }
    }

    pub fn proxy(target: ObjectId, traps: Rc<dyn ProxyTraps>) -> Self {
        Self {
            proxy: Some(ProxySlot { target, traps }),
            ..Self::new(None)
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.props.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropertyDescriptor> {
        self.props.get_mut(key)
    }

    /// Insert or replace; new keys go to the end of the key order
    pub fn insert(&mut self, key: &str, descriptor: PropertyDescriptor) {
        if self.props.insert(key.to_string(), descriptor).is_none() {
            self.keys.push(key.to_string());
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyDescriptor> {
        let removed = self.props.remove(key)?;
        self.keys.retain(|k| k != key);
        Some(removed)
    }

    pub fn seal(&mut self) {
        self.extensible = false;
        for desc in self.props.values_mut() {
            desc.configurable = false;
        }
    }

    pub fn freeze(&mut self) {
        self.seal();
        for desc in self.props.values_mut() {
            desc.writable = false;
        }
    }

    pub fn is_sealed(&self) -> bool {
        !self.extensible && self.props.values().all(|d| !d.configurable)
    }

    pub fn is_frozen(&self) -> bool {
        self.is_sealed() && self.props.values().all(|d| !d.writable)
    }
}
