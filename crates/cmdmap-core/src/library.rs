// library.rs — Invokable libraries and the catalog that holds them.
//
// A library is a named bundle of methods. Methods take no call arguments:
// everything they need is read from the pass's input pool. A library may
// also declare an ApiContract (method -> required input keys); when present,
// the safe zone only lets a method run once those keys are supplied.
//
// The catalog is the lookup table from library path to implementation, plus
// an optional bootstrap hook per module. It is built once at startup and
// shared read-only by every pass.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{DispatchError, InvokeError};
use crate::path::{resolve_module, SEPARATOR};
use crate::pool::InputPool;

/// The method every library may declare to run before anything else.
pub const INIT_METHOD: &str = "init";

/// Declared input requirements of a library's methods.
///
/// Declaration order is kept: with no bare methods requested, the safe zone
/// runs contract methods in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiContract {
    entries: Vec<(String, BTreeSet<String>)>,
}

impl ApiContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `method` needs every key in `keys` present in the input.
    /// Re-declaring a method replaces its requirement in place.
    pub fn require<I, K>(mut self, method: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(m, _)| m == method) {
            Some((_, existing)) => *existing = keys,
            None => self.entries.push((method.to_string(), keys)),
        }
        self
    }

    /// Required keys for `method`, if the contract lists it.
    pub fn required(&self, method: &str) -> Option<&BTreeSet<String>> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, keys)| keys)
    }

    /// Contract methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(m, _)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An invokable unit addressed by a library path.
///
/// Only methods listed by [`Library::methods`] are ever invoked; that list is
/// the public surface of the library.
pub trait Library: Send + Sync {
    /// Invocable method names, in declaration order.
    fn methods(&self) -> Vec<String>;

    /// The library's input contract, if it declares one.
    fn api(&self) -> Option<&ApiContract> {
        None
    }

    /// Call `method`. `input` is the pass's input pool at call time.
    fn invoke(&self, method: &str, input: &InputPool) -> Result<Value, InvokeError>;
}

type MethodFn = Arc<dyn Fn(&InputPool) -> Result<Value, InvokeError> + Send + Sync>;

/// A library assembled from closures.
///
/// ```
/// use cmdmap_core::{ApiContract, FnLibrary};
/// use serde_json::json;
///
/// let lib = FnLibrary::new()
///     .method("ping", |_| Ok(json!("pong")))
///     .with_api(ApiContract::new().require("ping", Vec::<String>::new()));
/// ```
#[derive(Clone, Default)]
pub struct FnLibrary {
    methods: Vec<(String, MethodFn)>,
    api: Option<ApiContract>,
}

impl FnLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a method.
    pub fn method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&InputPool) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        let f: MethodFn = Arc::new(f);
        match self.methods.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = f,
            None => self.methods.push((name.to_string(), f)),
        }
        self
    }

    /// Attach an input contract, turning on safe-zone checks for this library.
    pub fn with_api(mut self, api: ApiContract) -> Self {
        self.api = Some(api);
        self
    }
}

impl fmt::Debug for FnLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLibrary")
            .field("methods", &self.methods())
            .field("api", &self.api)
            .finish()
    }
}

impl Library for FnLibrary {
    fn methods(&self) -> Vec<String> {
        self.methods.iter().map(|(n, _)| n.clone()).collect()
    }

    fn api(&self) -> Option<&ApiContract> {
        self.api.as_ref()
    }

    fn invoke(&self, method: &str, input: &InputPool) -> Result<Value, InvokeError> {
        match self.methods.iter().find(|(n, _)| n == method) {
            Some((_, f)) => f(input),
            None => Err(InvokeError::new(format!("undefined method '{method}'"))),
        }
    }
}

/// One-time setup for a module, run before its first library in a pass.
pub type Bootstrap = Arc<dyn Fn() -> Result<(), InvokeError> + Send + Sync>;

/// Lookup table from library path to implementation.
///
/// Paths are stored without a leading separator, so `\user\account` and
/// `user\account` address the same library.
#[derive(Clone, Default)]
pub struct Catalog {
    libraries: HashMap<String, Arc<dyn Library>>,
    bootstraps: HashMap<String, Bootstrap>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a library under `path` (e.g. `user\account`).
    pub fn register<L>(&mut self, path: &str, library: L) -> Result<(), DispatchError>
    where
        L: Library + 'static,
    {
        let key = canonical(path);
        let offset = key
            .find(SEPARATOR)
            .ok_or_else(|| DispatchError::InvalidLibraryPath {
                path: path.to_string(),
                reason: "missing module separator".to_string(),
            })?;
        if resolve_module(key, offset as isize).is_none()
            || key.split(SEPARATOR).any(str::is_empty)
        {
            return Err(DispatchError::InvalidLibraryPath {
                path: path.to_string(),
                reason: "empty path segment".to_string(),
            });
        }
        if self.libraries.contains_key(key) {
            return Err(DispatchError::DuplicateLibrary {
                path: path.to_string(),
            });
        }
        tracing::debug!("catalog: registered library {}", key);
        self.libraries.insert(key.to_string(), Arc::new(library));
        Ok(())
    }

    /// Builder form of [`Catalog::register`].
    pub fn with_library<L>(mut self, path: &str, library: L) -> Result<Self, DispatchError>
    where
        L: Library + 'static,
    {
        self.register(path, library)?;
        Ok(self)
    }

    /// Set the bootstrap hook for `module`, replacing any previous one.
    pub fn set_bootstrap<F>(&mut self, module: &str, hook: F)
    where
        F: Fn() -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        self.bootstraps.insert(module.to_string(), Arc::new(hook));
    }

    /// Look up a library by path, with or without a leading separator.
    pub fn library(&self, path: &str) -> Option<&Arc<dyn Library>> {
        self.libraries.get(canonical(path))
    }

    pub fn bootstrap(&self, module: &str) -> Option<&Bootstrap> {
        self.bootstraps.get(module)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut libraries: Vec<&String> = self.libraries.keys().collect();
        libraries.sort();
        let mut bootstraps: Vec<&String> = self.bootstraps.keys().collect();
        bootstraps.sort();
        f.debug_struct("Catalog")
            .field("libraries", &libraries)
            .field("bootstraps", &bootstraps)
            .finish()
    }
}

fn canonical(path: &str) -> &str {
    path.strip_prefix(SEPARATOR).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo() -> FnLibrary {
        FnLibrary::new().method("echo", |input| Ok(Value::Object(input.to_map())))
    }

    #[test]
    fn contract_keeps_declaration_order_and_replaces_in_place() {
        let api = ApiContract::new()
            .require("run", ["x", "y"])
            .require("stop", Vec::<String>::new())
            .require("run", ["z"]);
        assert_eq!(api.methods().collect::<Vec<_>>(), vec!["run", "stop"]);
        assert_eq!(
            api.required("run").unwrap().iter().collect::<Vec<_>>(),
            vec!["z"]
        );
        assert!(api.required("missing").is_none());
    }

    #[test]
    fn fn_library_invokes_declared_methods_only() {
        let lib = FnLibrary::new().method("ping", |_| Ok(json!("pong")));
        let input = InputPool::new();
        assert_eq!(lib.invoke("ping", &input).unwrap(), json!("pong"));
        assert!(lib.invoke("pong", &input).is_err());
        assert_eq!(lib.methods(), vec!["ping".to_string()]);
        assert!(lib.api().is_none());
    }

    #[test]
    fn catalog_lookup_ignores_leading_separator() {
        let catalog = Catalog::new().with_library("user\\account", echo()).unwrap();
        assert!(catalog.library("user\\account").is_some());
        assert!(catalog.library("\\user\\account").is_some());
        assert!(catalog.library("user\\profile").is_none());
    }

    #[test]
    fn catalog_rejects_invalid_and_duplicate_paths() {
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.register("account", echo()),
            Err(DispatchError::InvalidLibraryPath { .. })
        ));
        assert!(matches!(
            catalog.register("user\\\\account", echo()),
            Err(DispatchError::InvalidLibraryPath { .. })
        ));
        catalog.register("\\user\\account", echo()).unwrap();
        assert!(matches!(
            catalog.register("user\\account", echo()),
            Err(DispatchError::DuplicateLibrary { .. })
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn catalog_stores_bootstrap_per_module() {
        let mut catalog = Catalog::new();
        catalog.set_bootstrap("user", || Ok(()));
        assert!(catalog.bootstrap("user").is_some());
        assert!(catalog.bootstrap("shop").is_none());
    }
}
