//! Shadow storage errors

use thiserror::Error;
use umbra_sdk::{HostError, ObjectId};

/// Shadow storage result
pub type ShadowResult<T> = Result<T, ShadowError>;

/// Errors raised by shadow-store and opaque-handle operations
///
/// All of these are programming errors: they are deterministic and are never
/// retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShadowError {
    /// Target of a store operation is not a live managed object
    #[error("Not an object: {0}")]
    NotAnObject(String),

    /// Mutation refused because the target is frozen, or is non-extensible
    /// and does not already own the field
    #[error("Can't {operation} hidden field; object {object} is frozen or not extensible")]
    FrozenOrNonExtensible {
        /// Target object
        object: ObjectId,
        /// "set" or "delete"
        operation: &'static str,
    },

    /// A value that is not an opaque handle was passed where one is required
    #[error("Opaque handle expected, got {0}")]
    InvalidHandle(String),

    /// Failure reported by the host object model
    #[error(transparent)]
    Host(#[from] HostError),
}
