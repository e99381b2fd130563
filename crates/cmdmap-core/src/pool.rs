// pool.rs — The input pool, the result pool and the output format.
//
// InputPool holds the request parameters that methods read. Routed results
// are written back into it mid-pass, so its key set (the "structure") is
// rebuilt after every mutation and is what the safe zone compares against.
//
// ResultPool collects one entry per executed method, keyed `library\method`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Live request parameters for one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputPool {
    values: Map<String, Value>,
    structure: BTreeSet<String>,
}

impl InputPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        let mut pool = Self {
            values,
            structure: BTreeSet::new(),
        };
        pool.rebuild_structure();
        pool
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.structure.contains(key)
    }

    /// Set `key`, overwriting any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let previous = self.values.insert(key.into(), value);
        self.rebuild_structure();
        previous
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.rebuild_structure();
        }
        removed
    }

    /// Add every entry of `other`, overwriting same-named keys.
    pub fn merge(&mut self, other: Map<String, Value>) {
        self.values.extend(other);
        self.rebuild_structure();
    }

    /// Current key set.
    pub fn structure(&self) -> &BTreeSet<String> {
        &self.structure
    }

    /// Keys of `required` that are not present right now.
    pub fn missing<'a>(&self, required: &'a BTreeSet<String>) -> Vec<&'a str> {
        required
            .iter()
            .filter(|key| !self.structure.contains(*key))
            .map(String::as_str)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.values.clone()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    fn rebuild_structure(&mut self) {
        self.structure = self.values.keys().cloned().collect();
    }
}

impl Serialize for InputPool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

/// Outputs of a pass, keyed `library\method`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultPool {
    entries: Map<String, Value>,
}

impl ResultPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a method's return value. Running the same key twice overwrites.
    pub fn record(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Store a failure message in place of a return value.
    pub fn record_failure(&mut self, key: impl Into<String>, message: impl fmt::Display) {
        self.entries
            .insert(key.into(), Value::String(message.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }
}

/// How the caller should render the result pool. The core never renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Raw,
}

impl Format {
    /// Recognize `json` or `raw` exactly; anything else is not a format.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Format::Json),
            "raw" => Some(Format::Raw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Raw => "raw",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
