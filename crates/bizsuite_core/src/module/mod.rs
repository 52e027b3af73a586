//! Uniform module contract.
//!
//! # Responsibility
//! - Define the capability interface every suite module implements:
//!   describe, fetch-all, execute-action and optional summarize.
//! - Define the typed request/reply envelopes shared by all modules.
//!
//! # Invariants
//! - The required operations are trait methods without defaults, so a
//!   module missing one does not compile. `summarize` defaults to `{}`.
//! - `Err(ModuleError)` is reserved for unexpected faults (storage, encoding).

use crate::context::ModuleContext;
use crate::store::StoreError;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod action;
pub mod info;

pub use action::{ActionParseError, ActionReply, ActionRequest};
pub use info::{validate_module_id, ModuleInfo, ModuleInfoError};

pub type ModuleResult<T> = Result<T, ModuleError>;

/// Unexpected module faults, surfaced by the dispatcher as failures.
#[derive(Debug)]
pub enum ModuleError {
    Store(StoreError),
    Encode(serde_json::Error),
}

impl Display for ModuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode module result: {err}"),
        }
    }
}

impl Error for ModuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StoreError> for ModuleError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for ModuleError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Capability interface of one suite module.
pub trait SuiteModule: Send + Sync {
    /// Stable registry identifier.
    fn id(&self) -> &str;

    /// Description record shown by the dashboard.
    fn info(&self) -> ModuleInfo;

    /// Full snapshot of the module document, re-read from storage.
    fn fetch_all(&self, ctx: &ModuleContext) -> ModuleResult<Value>;

    /// Runs one named action against the module document.
    fn execute(&self, ctx: &ModuleContext, request: &ActionRequest) -> ModuleResult<ActionReply>;

    /// Dashboard statistics, computed fresh on every call.
    fn summarize(&self, _ctx: &ModuleContext) -> ModuleResult<Value> {
        Ok(Value::Object(Map::new()))
    }
}

/// Read-only typed export of a module document for cross-module readers.
pub trait SnapshotSource {
    type Snapshot;

    fn export_snapshot(&self, ctx: &ModuleContext) -> ModuleResult<Self::Snapshot>;
}
