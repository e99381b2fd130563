// params.rs — Parsing `key=value` flags into request parameters.

use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};

/// Split `key=value`. The value is parsed as JSON when it is valid JSON,
/// otherwise it is kept as a plain string.
pub fn parse_pair(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got '{}'", raw))?;
    if key.is_empty() {
        anyhow::bail!("empty parameter name in '{}'", raw);
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Turn `key=path` into a file descriptor parameter.
pub fn file_descriptor(raw: &str) -> Result<(String, Value)> {
    let (key, path) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected KEY=PATH, got '{}'", raw))?;
    if key.is_empty() {
        anyhow::bail!("empty file parameter name in '{}'", raw);
    }
    let path = Path::new(path);
    let metadata = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("cannot read file '{}': {}", path.display(), e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((
        key.to_string(),
        json!({
            "name": name,
            "path": path.display().to_string(),
            "size": metadata.len(),
        }),
    ))
}
