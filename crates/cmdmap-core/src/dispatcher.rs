// dispatcher.rs — One request, one pass.
//
// A pass is: intake -> parse directives -> for each module (registry order):
// bootstrap once -> for each library: plan with the safe zone, run init if
// planned, then check and run each candidate in order.
//
// Everything mutable lives in `Pass` and is dropped with it. The catalog is
// shared read-only, so concurrent passes never see each other's state.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::authorizer::{Authorization, SafeZone};
use crate::config::DispatchConfig;
use crate::directive::DirectiveSet;
use crate::executor::{call_method, CallOutcome};
use crate::library::{Catalog, Library, INIT_METHOD};
use crate::pool::{Format, InputPool, ResultPool};
use crate::request::RawRequest;
use crate::trace::PassTrace;

/// Everything a pass hands back to its caller.
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// How the caller should render `results`.
    pub format: Format,
    /// One entry per executed method.
    pub results: ResultPool,
    /// The input pool as it stood at the end of the pass.
    pub input: InputPool,
    /// What was checked and done, in order.
    pub trace: PassTrace,
}

/// Entry point shared by all transports.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
    catalog: Arc<Catalog>,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig, catalog: impl Into<Arc<Catalog>>) -> Self {
        Self {
            config,
            catalog: catalog.into(),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run one pass for a transport request.
    pub fn handle(&self, request: RawRequest) -> PassOutcome {
        let intake = request.into_intake(&self.config);
        let directives = DirectiveSet::parse(intake.cmd.as_deref(), intake.map.as_deref());
        let mut pass = Pass::new(&self.catalog, self.safe_zone(), directives, intake.input);
        pass.run();
        pass.into_outcome(intake.format)
    }

    /// Run one pass from code, without going through request intake.
    pub fn call(&self, cmd: &str, map: Option<&str>, input: Map<String, Value>) -> PassOutcome {
        let directives = DirectiveSet::parse(Some(cmd), map);
        let mut pass = Pass::new(
            &self.catalog,
            self.safe_zone(),
            directives,
            InputPool::from_map(input),
        );
        pass.run();
        pass.into_outcome(Format::default())
    }

    fn safe_zone(&self) -> SafeZone {
        SafeZone::new(self.config.safe_zone)
    }
}

/// The state of a single parse -> authorize -> execute cycle.
pub struct Pass<'c> {
    catalog: &'c Catalog,
    safe_zone: SafeZone,
    directives: DirectiveSet,
    input: InputPool,
    results: ResultPool,
    trace: PassTrace,
}

impl<'c> Pass<'c> {
    pub fn new(
        catalog: &'c Catalog,
        safe_zone: SafeZone,
        directives: DirectiveSet,
        input: InputPool,
    ) -> Self {
        Self {
            catalog,
            safe_zone,
            directives,
            input,
            results: ResultPool::new(),
            trace: PassTrace::new(),
        }
    }

    /// Execute every requested library, in registry order.
    pub fn run(&mut self) {
        if self.directives.modules.is_empty()
            || (self.directives.methods.is_empty() && self.input.is_empty())
        {
            tracing::debug!("pass: nothing to run");
            return;
        }

        tracing::debug!(
            modules = self.directives.modules.len(),
            methods = self.directives.methods.len(),
            routes = self.directives.keymap.len(),
            inputs = self.input.len(),
            "pass: starting"
        );

        let modules: Vec<_> = self.directives.modules.iter().cloned().collect();
        for entry in modules {
            if !self.bootstrap(&entry.module) {
                continue;
            }
            for library in &entry.libraries {
                self.run_library(&entry.module, library);
            }
        }

        tracing::debug!(results = self.results.len(), "pass: finished");
    }

    /// Run the module's bootstrap hook, if any. False means skip the module.
    fn bootstrap(&mut self, module: &str) -> bool {
        let catalog = self.catalog;
        let hook = match catalog.bootstrap(module) {
            Some(hook) => hook,
            None => return true,
        };
        match hook() {
            Ok(()) => {
                tracing::debug!("bootstrapped module {}", module);
                self.trace.module(module, "bootstrap", "ok");
                true
            }
            Err(err) => {
                tracing::warn!("bootstrap of module {} failed: {}", module, err);
                self.trace
                    .module(module, "bootstrap", format!("failed: {err}"));
                false
            }
        }
    }

    fn run_library(&mut self, module: &str, path: &str) {
        let catalog = self.catalog;
        let library = match catalog.library(path) {
            Some(library) => {
                self.trace.library(module, path, "library_lookup", "found");
                library.as_ref()
            }
            None => {
                tracing::debug!("no library registered at {}", path);
                self.trace
                    .library(module, path, "library_lookup", "unknown library");
                return;
            }
        };

        let plan = self.safe_zone.plan(library, &self.directives.methods);

        if plan.init_first {
            self.trace
                .method(module, path, INIT_METHOD, "init_first", "scheduled");
            self.call(module, path, library, INIT_METHOD);
        }

        for method in &plan.candidates {
            match self.safe_zone.authorize(library, method, &self.input) {
                Authorization::Allow => {
                    self.trace
                        .method(module, path, method, "safe_zone", "allowed");
                    self.call(module, path, library, method);
                }
                Authorization::Deny { missing } => {
                    self.trace.method(
                        module,
                        path,
                        method,
                        "safe_zone",
                        format!("denied: missing [{}]", missing.join(", ")),
                    );
                }
            }
        }
    }

    fn call(&mut self, module: &str, path: &str, library: &dyn Library, method: &str) {
        let outcome = call_method(
            path,
            library,
            method,
            &self.directives.keymap,
            &mut self.input,
            &mut self.results,
        );
        let summary = match outcome {
            CallOutcome::Undeclared => "undeclared".to_string(),
            CallOutcome::Empty => "returned null".to_string(),
            CallOutcome::Stored { routed_to: None } => "stored".to_string(),
            CallOutcome::Stored {
                routed_to: Some(to),
            } => format!("stored, routed to '{to}'"),
            CallOutcome::Failed { message } => format!("failed: {message}"),
        };
        self.trace.method(module, path, method, "invoke", summary);
    }

    pub fn input(&self) -> &InputPool {
        &self.input
    }

    pub fn results(&self) -> &ResultPool {
        &self.results
    }

    pub fn trace(&self) -> &PassTrace {
        &self.trace
    }

    pub fn into_outcome(self, format: Format) -> PassOutcome {
        PassOutcome {
            format,
            results: self.results,
            input: self.input,
            trace: self.trace,
        }
    }
}
