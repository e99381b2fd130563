// executor.rs — Chained method execution.
//
// `call_method` runs one library method and folds its outcome into the pass:
//
//   failure  -> message stored in the result pool under `library\method`
//   null     -> nothing stored, nothing routed
//   value    -> stored; if the key map routes this key, the value (or a
//               nested part of it) is written into the input pool
//
// A panic inside the method is caught and stored like any other failure, so
// sibling calls still run. Catching does not silence the process panic hook:
// unless the host installs its own (the `cmdmap` binary routes it into the
// log), the default hook still prints its report to stderr.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::error::InvokeError;
use crate::library::Library;
use crate::path::SEPARATOR;
use crate::pool::{InputPool, ResultPool};
use crate::registry::KeyMap;

/// What happened to one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The library does not declare the method; nothing ran.
    Undeclared,
    /// The method returned null.
    Empty,
    /// The result was stored, and possibly routed into the input pool.
    Stored { routed_to: Option<String> },
    /// The method failed; its message was stored.
    Failed { message: String },
}

/// Result pool key for a method of a library.
pub fn result_key(library: &str, method: &str) -> String {
    format!("{library}{SEPARATOR}{method}")
}

/// Invoke `method` on `library` and record the outcome.
pub fn call_method(
    library_path: &str,
    library: &dyn Library,
    method: &str,
    keymap: &KeyMap,
    input: &mut InputPool,
    results: &mut ResultPool,
) -> CallOutcome {
    if !library.methods().iter().any(|m| m == method) {
        return CallOutcome::Undeclared;
    }

    let key = result_key(library_path, method);
    tracing::debug!("invoking {}", key);

    let value = match invoke_isolated(library, method, input) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("{} failed: {}", key, err);
            let message = err.to_string();
            results.record_failure(&key, &message);
            return CallOutcome::Failed { message };
        }
    };

    if value.is_null() {
        return CallOutcome::Empty;
    }

    let routed = keymap
        .get(&key)
        .and_then(|entry| route(&value, &entry.from).map(|v| (entry.to.clone(), v)));
    results.record(&key, value);

    match routed {
        Some((to, routed_value)) => {
            tracing::debug!("routing {} -> input '{}'", key, to);
            input.insert(to.clone(), routed_value);
            CallOutcome::Stored {
                routed_to: Some(to),
            }
        }
        None => CallOutcome::Stored { routed_to: None },
    }
}

/// Extract the value to route from a method result.
///
/// An empty `from`, or a result that is neither an object nor an array, routes
/// the result as-is. Otherwise each key is looked up in turn (array elements
/// by decimal index); a missing or null step yields `None`.
pub fn route(result: &Value, from: &[String]) -> Option<Value> {
    if from.is_empty() || !(result.is_object() || result.is_array()) {
        return Some(result.clone());
    }
    let mut current = result;
    for key in from {
        let next = match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current.clone())
}

fn invoke_isolated(
    library: &dyn Library,
    method: &str,
    input: &InputPool,
) -> Result<Value, InvokeError> {
    match panic::catch_unwind(AssertUnwindSafe(|| library.invoke(method, input))) {
        Ok(result) => result,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("method '{method}' panicked")
            };
            Err(InvokeError::Panicked(message))
        }
    }
}
