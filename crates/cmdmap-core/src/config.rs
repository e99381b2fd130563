//! Dispatcher configuration structures

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Top-level dispatcher configuration, usually read from `cmdmap.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Enforce library API contracts before running a method.
    #[serde(default = "default_safe_zone")]
    pub safe_zone: bool,

    /// Accept query parameters as request input (body parameters always count).
    #[serde(default = "default_accept_query")]
    pub accept_query: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            safe_zone: default_safe_zone(),
            accept_query: default_accept_query(),
        }
    }
}

impl DispatchConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, DispatchError> {
        let content = std::fs::read_to_string(path).map_err(|source| DispatchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| DispatchError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from a TOML file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, DispatchError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

// Serde default functions
fn default_safe_zone() -> bool {
    true
}

fn default_accept_query() -> bool {
    true
}
