//! # cmdmap-core
//!
//! Directive-driven method dispatcher.
//!
//! A request carries two directive strings next to its ordinary parameters:
//!
//! - `cmd`: which libraries to load and, optionally, which bare methods to
//!   call on them (`user\account,shop\cart,login`).
//! - `map`: how to route one method's result into the input of later
//!   methods (`user\account\login\token:auth_token`).
//!
//! The [`Dispatcher`] parses both, looks the libraries up in a [`Catalog`],
//! lets the [`SafeZone`] decide which methods may run, and executes them in
//! directive order. Results land in a [`ResultPool`]; routed values are
//! written back into the [`InputPool`] so later calls can see them.
//!
//! ## Key invariants
//!
//! - **Contracts gate execution**: with the safe zone on, a method runs only
//!   when every input key its [`ApiContract`] requires is present at the
//!   moment it is reached.
//! - **Init first**: a declared `init` that is not itself a candidate always
//!   runs before the library's other methods.
//! - **Nothing aborts a pass**: bad directives and denied methods are
//!   skipped, failures become message strings in the result pool.
//! - **Pass isolation**: all mutable state belongs to one [`Pass`].

pub mod authorizer;
pub mod config;
pub mod directive;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod library;
pub mod path;
pub mod pool;
pub mod registry;
pub mod request;
pub mod trace;

pub use authorizer::{Authorization, LibraryPlan, SafeZone};
pub use config::DispatchConfig;
pub use directive::{Directive, DirectiveSet};
pub use dispatcher::{Dispatcher, Pass, PassOutcome};
pub use error::{DispatchError, InvokeError};
pub use executor::CallOutcome;
pub use library::{ApiContract, Catalog, FnLibrary, Library};
pub use path::{resolve_module, SEPARATOR};
pub use pool::{Format, InputPool, ResultPool};
pub use registry::{KeyMap, KeyMapEntry, MethodList, ModuleRegistry};
pub use request::{Intake, RawRequest};
pub use trace::{PassTrace, TraceStep};
