// registry.rs — Per-pass bookkeeping built by the directive parser.
//
// ModuleRegistry: module -> libraries requested under it (insertion order).
// MethodList:     bare method names requested without a library.
// KeyMap:         library\method -> where its result is routed.
//
// All three are rebuilt for every pass and dropped with it.

use std::collections::HashMap;

/// Libraries requested under one module, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub module: String,
    pub libraries: Vec<String>,
}

/// Ordered mapping from module name to the library paths requested under it.
///
/// Modules keep the order in which they were first seen; libraries inside a
/// module are de-duplicated and keep first-seen order too. That order is the
/// execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `library` under `module`. Returns false when it was already
    /// present, or when either name is empty (nothing is registered then).
    pub fn insert(&mut self, module: &str, library: &str) -> bool {
        if module.is_empty() || library.is_empty() {
            return false;
        }
        let entry = match self.entries.iter_mut().position(|e| e.module == module) {
            Some(idx) => &mut self.entries[idx],
            None => {
                self.entries.push(ModuleEntry {
                    module: module.to_string(),
                    libraries: Vec::new(),
                });
                let last = self.entries.len() - 1;
                &mut self.entries[last]
            }
        };
        if entry.libraries.iter().any(|l| l == library) {
            return false;
        }
        entry.libraries.push(library.to_string());
        true
    }

    /// Libraries registered under `module`, if the module is known.
    pub fn libraries(&self, module: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.module == module)
            .map(|e| e.libraries.as_slice())
    }

    pub fn contains_module(&self, module: &str) -> bool {
        self.libraries(module).is_some()
    }

    pub fn contains_library(&self, module: &str, library: &str) -> bool {
        self.libraries(module)
            .is_some_and(|libs| libs.iter().any(|l| l == library))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Bare method names, de-duplicated, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodList {
    methods: Vec<String>,
}

impl MethodList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: &str) -> bool {
        if self.contains(method) {
            return false;
        }
        self.methods.push(method.to_string());
        true
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }
}

/// Where the result of one `library\method` call is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapEntry {
    /// Result key this entry applies to (`library\method`).
    pub library_method_key: String,
    /// Keys walked into the result, outermost first. Empty means the raw result.
    pub from: Vec<String>,
    /// InputPool key that receives the extracted value.
    pub to: String,
}

/// Routing table keyed by `library\method`. A later directive for the same
/// key replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    entries: HashMap<String, KeyMapEntry>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: KeyMapEntry) {
        self.entries
            .insert(entry.library_method_key.clone(), entry);
    }

    pub fn get(&self, library_method_key: &str) -> Option<&KeyMapEntry> {
        self.entries.get(library_method_key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
