//! Attribute descriptors

use crate::value::Value;

/// Data attribute descriptor with ES5-style flags
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Stored value
    pub value: Value,
    /// Whether the value may be reassigned
    pub writable: bool,
    /// Whether the key shows up in enumerable key listings
    pub enumerable: bool,
    /// Whether the attribute may be deleted or redefined
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Ordinary attribute: writable, enumerable, configurable
    pub fn data(value: Value) -> Self {
        Self {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Locked-down attribute: not writable, not enumerable, not configurable
    pub fn hidden(value: Value) -> Self {
        Self {
            value,
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }

    /// Replace the writable flag
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Replace the enumerable flag
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    /// Replace the configurable flag
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }
}
