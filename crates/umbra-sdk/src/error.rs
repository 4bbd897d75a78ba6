//! Error types for the host object-model contract

use crate::value::ObjectId;

/// Result type for host object-model calls
pub type HostResult<T> = Result<T, HostError>;

/// Failures reported by a host object model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// Object id not known to the host
    #[error("No such object: {0}")]
    NoSuchObject(ObjectId),

    /// New attribute refused on a non-extensible object
    #[error("Cannot add property {key}, object {object} is not extensible")]
    NotExtensible {
        /// Target object
        object: ObjectId,
        /// Attribute key
        key: String,
    },

    /// Redefinition or deletion of a non-configurable attribute
    #[error("Cannot redefine property {key} on object {object}")]
    NonConfigurable {
        /// Target object
        object: ObjectId,
        /// Attribute key
        key: String,
    },

    /// Assignment to a non-writable attribute
    #[error("Cannot assign to read only property {key} of object {object}")]
    ReadOnly {
        /// Target object
        object: ObjectId,
        /// Attribute key
        key: String,
    },

    /// Optional capability not provided by this host
    #[error("Unsupported host operation: {0}")]
    Unsupported(&'static str),
}
