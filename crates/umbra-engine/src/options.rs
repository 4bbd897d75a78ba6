//! Realm configuration
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! auto_attach_on_create = true
//! handle_prefix = "!Y:"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::defaults::{DEFAULT_AUTO_ATTACH_ON_CREATE, DEFAULT_HANDLE_PREFIX};

/// Errors from loading realm options
#[derive(Debug, Error)]
pub enum OptionsError {
    /// File could not be read
    #[error("Failed to read realm options: {0}")]
    Io(#[from] std::io::Error),

    /// TOML did not parse or had the wrong shape
    #[error("Failed to parse realm options: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field parsed but holds an unusable value
    #[error("Invalid realm option `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Configuration for a [`Realm`](crate::Realm)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RealmOptions {
    /// Attach a shadow store to every object created through the realm,
    /// including null-prototype objects
    pub auto_attach_on_create: bool,
    /// Prefix of every opaque handle id
    pub handle_prefix: String,
}

impl Default for RealmOptions {
    fn default() -> Self {
        Self {
            auto_attach_on_create: DEFAULT_AUTO_ATTACH_ON_CREATE,
            handle_prefix: DEFAULT_HANDLE_PREFIX.to_string(),
        }
    }
}

impl RealmOptions {
    /// Parse options from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, OptionsError> {
        let options: Self = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check field values that parse but cannot work
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.handle_prefix.is_empty() {
            return Err(OptionsError::Invalid {
                field: "handle_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
