//! Umbra Shadow Storage Engine
//!
//! This crate layers hidden, per-object storage over any host object model:
//! - **Identifier generation**: process-unique opaque strings (`ident` module)
//! - **Realm**: the decorator that owns shadow stores, the Access Gate, the
//!   filtered reflection surface and opaque handles (`realm` module)
//! - **Heap**: an in-memory reference host (`heap` module)
//! - **Options**: realm configuration, loadable from TOML (`options` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use umbra_engine::{Realm, Value};
//!
//! let realm = Realm::new();
//! let obj = realm.create_object(None)?;
//! let handle = realm.create_handle()?.to_value();
//!
//! realm.set_field(&obj, &handle, Value::from("secret"))?;
//! assert!(realm.has_field(&obj, &handle)?);
//!
//! // Reflection never shows the hidden slot
//! assert!(realm.own_keys(&obj)?.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod defaults;
pub mod error;
pub mod heap;
pub mod ident;
pub mod options;
pub mod realm;

pub use error::{ShadowError, ShadowResult};
pub use heap::Heap;
pub use ident::{new_identifier, reserved_slot_name, IdentifierGenerator, RandomSource, SystemRandom};
pub use options::{OptionsError, RealmOptions};
pub use realm::{AccessGate, GateState, OpaqueHandle, PendingField, Realm, Shadow, ShadowStore};

pub use umbra_sdk::{
    HostError, HostResult, ObjectId, ObjectModel, PropertyDescriptor, ProxyTraps, Value,
};
