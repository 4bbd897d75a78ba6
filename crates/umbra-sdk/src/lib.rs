//! Umbra SDK - host object-model contract
//!
//! This crate defines the minimal types and traits a host object model must
//! provide so that `umbra-engine` can layer hidden per-object storage on top
//! of it, without depending on the engine itself.
//!
//! The contract is deliberately small:
//! - [`ObjectModel`]: attribute storage, prototype links, extensibility and
//!   freeze/seal state, plus the reflection surface (key enumeration and
//!   descriptor queries)
//! - [`ProxyTraps`]: the optional interception layer over objects
//! - [`Value`], [`ObjectId`] and [`PropertyDescriptor`]: the data exchanged
//!   across the boundary
//!
//! # Example
//!
//! ```ignore
//! use umbra_sdk::{ObjectModel, PropertyDescriptor, Value};
//!
//! fn tag(host: &impl ObjectModel) -> umbra_sdk::HostResult<()> {
//!     let obj = host.create_object(None);
//!     host.define_property(obj, "kind", PropertyDescriptor::data(Value::from("tag")))?;
//!     assert!(host.has_own(obj, "kind")?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod host;
pub mod proxy;
pub mod value;

pub use descriptor::PropertyDescriptor;
pub use error::{HostError, HostResult};
pub use host::ObjectModel;
pub use proxy::ProxyTraps;
pub use value::{ObjectId, Value};
