//! Access Gate
//!
//! The reserved slot only supports a zero-argument read and a one-argument
//! write, so a field name has to be staged before the slot is touched:
//!
//! 1. `prepare(name)` stores a one-shot pending field name
//! 2. the next touch of the reserved slot consumes it and performs exactly
//!    one `get` or `set` against that field
//!
//! Engine-internal code reaches an object's store by opening the gate and
//! touching the slot; the touch re-arms the gate, so an open gate is never
//! observable past a single touch. All flag changes are made through guards
//! whose `Drop` restores the previous state, including on early `?` returns.

use std::cell::{Cell, RefCell};

use tracing::trace;

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// The next touch of the slot yields the raw store to engine code
    Open,
    /// A touch of the slot performs one routed get/set, or yields a sentinel
    Armed,
}

/// A field name staged for the next touch of the reserved slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingField {
    /// Hidden field to read or write
    pub name: String,
    /// Skip the frozen/non-extensible check on write
    pub override_permitted: bool,
}

/// One-shot arm/trigger state machine guarding the reserved slot
#[derive(Debug)]
pub struct AccessGate {
    state: Cell<GateState>,
    auto_attach: Cell<bool>,
    pending: RefCell<Option<PendingField>>,
}

impl AccessGate {
    /// Armed, auto-attaching, nothing pending
    pub fn new() -> Self {
        Self {
            state: Cell::new(GateState::Armed),
            auto_attach: Cell::new(true),
            pending: RefCell::new(None),
        }
    }

    /// Current state
    pub fn state(&self) -> GateState {
        self.state.get()
    }

    /// Whether the gate is armed
    pub fn is_armed(&self) -> bool {
        self.state.get() == GateState::Armed
    }

    /// Whether touching the slot of a store-less object may create a store
    pub fn auto_attach(&self) -> bool {
        self.auto_attach.get()
    }

    /// Whether a field name is staged
    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Stage a field name for the next touch; replaces anything already staged
    pub fn prepare(&self, name: impl Into<String>, override_permitted: bool) {
        trace!(override_permitted, "access gate: field name staged");
        *self.pending.borrow_mut() = Some(PendingField {
            name: name.into(),
            override_permitted,
        });
    }

    /// Consume the staged field name
    pub fn take_pending(&self) -> Option<PendingField> {
        let pending = self.pending.borrow_mut().take();
        if pending.is_some() {
            trace!("access gate: staged field name consumed");
        }
        pending
    }

    /// Drop anything staged and return to the resting state
    pub fn reset(&self) {
        self.state.set(GateState::Armed);
        self.auto_attach.set(true);
        self.pending.borrow_mut().take();
    }

    pub(crate) fn arm(&self) {
        self.state.set(GateState::Armed);
    }

    /// Open the gate for one engine-internal touch of the slot
    pub(crate) fn open(&self) -> OpenGuard<'_> {
        trace!("access gate: opened");
        self.state.set(GateState::Open);
        OpenGuard { gate: self }
    }

    /// Disable auto-attach for the lifetime of the guard
    pub(crate) fn suspend_auto_attach(&self) -> AutoAttachGuard<'_> {
        let previous = self.auto_attach.replace(false);
        AutoAttachGuard {
            gate: self,
            previous,
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-arms the gate when dropped
pub(crate) struct OpenGuard<'a> {
    gate: &'a AccessGate,
}

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        self.gate.arm();
    }
}

/// Restores the previous auto-attach flag when dropped
pub(crate) struct AutoAttachGuard<'a> {
    gate: &'a AccessGate,
    previous: bool,
}

impl Drop for AutoAttachGuard<'_> {
    fn drop(&mut self) {
        self.gate.auto_attach.set(self.previous);
    }
}
