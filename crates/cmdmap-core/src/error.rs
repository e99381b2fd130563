// error.rs — Error types for the dispatcher.
//
// Two families live here. `DispatchError` covers setup: loading config and
// registering libraries in a catalog. `InvokeError` is what a library method
// hands back when it fails; its message ends up in the result pool and never
// aborts a pass.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring a dispatcher or building its catalog.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The config file could not be read.
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `DispatchConfig`.
    #[error("invalid config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A library path does not name a module (e.g. no separator, empty segment).
    #[error("invalid library path '{path}': {reason}")]
    InvalidLibraryPath { path: String, reason: String },

    /// The same library path was registered twice.
    #[error("library '{path}' is already registered")]
    DuplicateLibrary { path: String },
}

/// A failed library method call.
///
/// The `Display` output is the exact string stored in the result pool under
/// the method's `library\method` key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The method reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The method panicked; the payload message is kept when it is a string.
    #[error("{0}")]
    Panicked(String),
}

impl InvokeError {
    /// Build a failure from any message.
    pub fn new(message: impl Into<String>) -> Self {
        InvokeError::Failed(message.into())
    }
}

impl From<String> for InvokeError {
    fn from(message: String) -> Self {
        InvokeError::Failed(message)
    }
}

impl From<&str> for InvokeError {
    fn from(message: &str) -> Self {
        InvokeError::Failed(message.to_string())
    }
}
