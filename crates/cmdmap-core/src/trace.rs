// trace.rs — Ordered record of what a pass checked and did.
//
// Unauthorized methods leave no mark in the result pool, so the trace is the
// only place a caller can see why something did not run. It is purely
// observational: nothing reads it back during a pass.

use serde::{Deserialize, Serialize};

/// One recorded step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceStep {
    /// Module the step belongs to.
    pub module: String,
    /// Library path as requested, when the step concerns a library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    /// Method name, when the step concerns a method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Which check was performed: "bootstrap", "library_lookup", "init_first",
    /// "safe_zone" or "invoke".
    pub check: String,
    /// What came out of it (e.g. "found", "allowed", "denied: missing [y]").
    pub outcome: String,
}

/// All steps of one pass, in the order they happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PassTrace {
    steps: Vec<TraceStep>,
}

impl PassTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(&mut self, module: &str, check: &str, outcome: impl Into<String>) {
        self.steps.push(TraceStep {
            module: module.to_string(),
            library: None,
            method: None,
            check: check.to_string(),
            outcome: outcome.into(),
        });
    }

    pub fn library(
        &mut self,
        module: &str,
        library: &str,
        check: &str,
        outcome: impl Into<String>,
    ) {
        self.steps.push(TraceStep {
            module: module.to_string(),
            library: Some(library.to_string()),
            method: None,
            check: check.to_string(),
            outcome: outcome.into(),
        });
    }

    pub fn method(
        &mut self,
        module: &str,
        library: &str,
        method: &str,
        check: &str,
        outcome: impl Into<String>,
    ) {
        self.steps.push(TraceStep {
            module: module.to_string(),
            library: Some(library.to_string()),
            method: Some(method.to_string()),
            check: check.to_string(),
            outcome: outcome.into(),
        });
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Steps recorded for one method of one library.
    pub fn for_method<'a>(
        &'a self,
        library: &'a str,
        method: &'a str,
    ) -> impl Iterator<Item = &'a TraceStep> + 'a {
        self.steps.iter().filter(move |s| {
            s.library.as_deref() == Some(library) && s.method.as_deref() == Some(method)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
