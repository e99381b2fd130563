// request.rs — Turning a transport's raw parameters into pass input.
//
// A transport hands over up to three parameter sets: query, body and file
// uploads. Query parameters only count when the config accepts them, and
// body values win over query values with the same key. The reserved keys
// `format`, `cmd` and `map` are pulled out before anything becomes input;
// file descriptors are merged last.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DispatchConfig;
use crate::pool::{Format, InputPool};

/// Reserved parameter selecting the output format.
pub const FORMAT_KEY: &str = "format";
/// Reserved parameter carrying the cmd directives.
pub const CMD_KEY: &str = "cmd";
/// Reserved parameter carrying the map directives.
pub const MAP_KEY: &str = "map";

const RESERVED_KEYS: [&str; 3] = [FORMAT_KEY, CMD_KEY, MAP_KEY];

/// Parameters as delivered by a transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRequest {
    #[serde(default)]
    pub query: Map<String, Value>,
    #[serde(default)]
    pub body: Map<String, Value>,
    #[serde(default)]
    pub files: Map<String, Value>,
}

/// A request split into directives, format intent and input pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intake {
    pub format: Format,
    pub cmd: Option<String>,
    pub map: Option<String>,
    pub input: InputPool,
}

impl RawRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request whose parameters all arrived in the body.
    pub fn from_body(body: Map<String, Value>) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: Value) -> Self {
        self.query.insert(key.into(), value);
        self
    }

    pub fn with_body(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    pub fn with_file(mut self, key: impl Into<String>, descriptor: Value) -> Self {
        self.files.insert(key.into(), descriptor);
        self
    }

    /// Split into directives and input according to `config`.
    pub fn into_intake(self, config: &DispatchConfig) -> Intake {
        let mut params = if config.accept_query {
            let mut merged = self.query;
            merged.extend(self.body);
            merged
        } else {
            self.body
        };

        let format = params
            .remove(FORMAT_KEY)
            .and_then(|v| v.as_str().and_then(Format::parse))
            .unwrap_or_default();
        let cmd = params.remove(CMD_KEY).and_then(into_string);
        let map = params.remove(MAP_KEY).and_then(into_string);

        let mut input = InputPool::from_map(params);
        let files: Map<String, Value> = self
            .files
            .into_iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .collect();
        if !files.is_empty() {
            input.merge(files);
        }

        Intake {
            format,
            cmd,
            map,
            input,
        }
    }
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}
