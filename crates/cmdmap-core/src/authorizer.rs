// authorizer.rs — The safe zone.
//
// Decides which methods of a library may run in this pass. With the safe
// zone on, a method must be:
//
// 1. declared by the library,
// 2. listed in the library's ApiContract,
// 3. requested as a bare method (only checked when any bare method was requested),
// 4. satisfied: every key its contract requires is in the input pool *now*.
//
// Steps 1-3 produce an ordered candidate list once per library. Step 4 runs
// for each candidate right before it would execute, because earlier calls
// can route new keys into the input pool.
//
// With the safe zone off, only steps 1 and 3 apply, and a library runs
// nothing unless bare methods were requested.
//
// Either way, a declared `init` that did not make the candidate list runs
// first, unconditionally.

use serde::{Deserialize, Serialize};

use crate::library::{Library, INIT_METHOD};
use crate::pool::InputPool;
use crate::registry::MethodList;

/// What the safe zone plans to do with one library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryPlan {
    /// Run `init` before any candidate.
    pub init_first: bool,
    /// Methods to consider, in execution order.
    pub candidates: Vec<String>,
}

/// The outcome of checking one candidate against the input pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Authorization {
    /// Every required key is present (or the safe zone is off).
    Allow,
    /// Some required keys are absent.
    Deny { missing: Vec<String> },
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allow)
    }
}

/// The safe-zone authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeZone {
    enabled: bool,
}

impl SafeZone {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Compute the ordered candidate list for `library`.
    pub fn plan(&self, library: &dyn Library, requested: &MethodList) -> LibraryPlan {
        let declared = library.methods();
        let is_declared = |m: &str| declared.iter().any(|d| d == m);

        let candidates: Vec<String> = if self.enabled {
            let api = match library.api() {
                Some(api) => api,
                None => {
                    return LibraryPlan {
                        init_first: is_declared(INIT_METHOD),
                        candidates: Vec::new(),
                    }
                }
            };
            let in_api = |m: &str| api.required(m).is_some();
            if requested.is_empty() {
                api.methods()
                    .filter(|m| is_declared(*m))
                    .map(str::to_string)
                    .collect()
            } else {
                requested
                    .iter()
                    .filter(|m| in_api(*m) && is_declared(*m))
                    .map(str::to_string)
                    .collect()
            }
        } else if requested.is_empty() {
            // Nothing named, nothing runs. Not even init.
            return LibraryPlan::default();
        } else {
            requested
                .iter()
                .filter(|m| is_declared(*m))
                .map(str::to_string)
                .collect()
        };

        let init_first =
            is_declared(INIT_METHOD) && !candidates.iter().any(|c| c == INIT_METHOD);
        LibraryPlan {
            init_first,
            candidates,
        }
    }

    /// Check one candidate against the input pool as it is right now.
    pub fn authorize(
        &self,
        library: &dyn Library,
        method: &str,
        input: &InputPool,
    ) -> Authorization {
        if !self.enabled {
            return Authorization::Allow;
        }
        let required = match library.api().and_then(|api| api.required(method)) {
            Some(required) => required,
            None => {
                // Not in the contract: never a candidate under the safe zone.
                return Authorization::Deny {
                    missing: Vec::new(),
                };
            }
        };
        let missing = input.missing(required);
        if missing.is_empty() {
            Authorization::Allow
        } else {
            Authorization::Deny {
                missing: missing.into_iter().map(str::to_string).collect(),
            }
        }
    }
}

impl Default for SafeZone {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{ApiContract, FnLibrary};
    use serde_json::{json, Value};

    /// Helper: a library declaring `methods`, each returning its own name.
    fn library(methods: &[&str], api: Option<ApiContract>) -> FnLibrary {
        let mut lib = FnLibrary::new();
        for name in methods {
            let result = json!(name);
            lib = lib.method(name, move |_| Ok(result.clone()));
        }
        match api {
            Some(api) => lib.with_api(api),
            None => lib,
        }
    }

    fn requested(methods: &[&str]) -> MethodList {
        let mut list = MethodList::new();
        for m in methods {
            list.insert(m);
        }
        list
    }

    fn input(value: Value) -> InputPool {
        match value {
            Value::Object(map) => InputPool::from_map(map),
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn run_denied_until_every_required_key_is_present() {
        let lib = library(
            &["run", "init"],
            Some(ApiContract::new().require("run", ["x", "y"])),
        );
        let zone = SafeZone::new(true);

        let mut pool = input(json!({"x": 1}));
        assert_eq!(
            zone.authorize(&lib, "run", &pool),
            Authorization::Deny {
                missing: vec!["y".to_string()]
            }
        );

        pool.insert("y", json!(2));
        assert_eq!(zone.authorize(&lib, "run", &pool), Authorization::Allow);
    }

    #[test]
    fn plan_without_bare_methods_follows_contract_order() {
        let lib = library(
            &["a", "b", "c"],
            Some(
                ApiContract::new()
                    .require("c", Vec::<String>::new())
                    .require("a", Vec::<String>::new())
                    .require("ghost", Vec::<String>::new()),
            ),
        );
        let plan = SafeZone::new(true).plan(&lib, &MethodList::new());
        assert_eq!(plan.candidates, vec!["c", "a"]);
        assert!(!plan.init_first);
    }

    #[test]
    fn plan_with_bare_methods_follows_request_order() {
        let api = ApiContract::new()
            .require("a", Vec::<String>::new())
            .require("b", Vec::<String>::new());
        let lib = library(&["a", "b", "c"], Some(api));
        let plan = SafeZone::new(true).plan(&lib, &requested(&["b", "c", "a"]));
        // "c" is declared but not in the contract.
        assert_eq!(plan.candidates, vec!["b", "a"]);
    }

    #[test]
    fn init_runs_first_when_not_a_candidate() {
        let lib = library(
            &["init", "run"],
            Some(ApiContract::new().require("run", Vec::<String>::new())),
        );
        let plan = SafeZone::new(true).plan(&lib, &MethodList::new());
        assert!(plan.init_first);
        assert_eq!(plan.candidates, vec!["run"]);
    }

    #[test]
    fn init_in_contract_is_an_ordinary_candidate() {
        let lib = library(
            &["init", "run"],
            Some(
                ApiContract::new()
                    .require("run", Vec::<String>::new())
                    .require("init", ["seed"]),
            ),
        );
        let plan = SafeZone::new(true).plan(&lib, &MethodList::new());
        assert!(!plan.init_first);
        assert_eq!(plan.candidates, vec!["run", "init"]);
    }

    #[test]
    fn library_without_contract_only_runs_init_under_safe_zone() {
        let lib = library(&["init", "run"], None);
        let plan = SafeZone::new(true).plan(&lib, &requested(&["run"]));
        assert!(plan.init_first);
        assert!(plan.candidates.is_empty());
    }

    #[test]
    fn disabled_zone_needs_bare_methods() {
        let lib = library(&["init", "run"], None);
        let zone = SafeZone::new(false);

        assert_eq!(zone.plan(&lib, &MethodList::new()), LibraryPlan::default());

        let plan = zone.plan(&lib, &requested(&["run", "missing"]));
        assert!(plan.init_first);
        assert_eq!(plan.candidates, vec!["run"]);
        assert!(zone.authorize(&lib, "run", &InputPool::new()).is_allowed());
    }
}
