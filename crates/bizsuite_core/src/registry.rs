//! Module registry and startup discovery.
//!
//! # Responsibility
//! - Validate candidate modules and index them by id.
//! - Keep registration order for listing and the dashboard.
//!
//! # Invariants
//! - A malformed or faulting candidate is skipped with a warning; it never
//!   aborts discovery of the others.
//! - Ids are unique; the first registration of an id wins.
//! - The registry is read-only once discovery returns.

use crate::context::ModuleContext;
use crate::logging::panic_payload_summary;
use crate::module::{
    validate_module_id, ActionReply, ActionRequest, ModuleInfo, ModuleInfoError, ModuleResult,
    SuiteModule,
};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Registry entry: validated id and description plus the module handle.
#[derive(Clone)]
pub struct ModuleDescriptor {
    id: String,
    info: ModuleInfo,
    module: Arc<dyn SuiteModule>,
}

impl ModuleDescriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Normalized description record.
    pub fn info(&self) -> &ModuleInfo {
        &self.info
    }

    pub fn fetch_all(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        self.module.fetch_all(ctx)
    }

    pub fn execute(
        &self,
        ctx: &ModuleContext,
        request: &ActionRequest,
    ) -> ModuleResult<ActionReply> {
        self.module.execute(ctx, request)
    }

    pub fn summarize(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        self.module.summarize(ctx)
    }
}

impl std::fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Candidate rejected during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedModule {
    /// Reported id, or `"<unknown>"` when the candidate faulted before giving one.
    pub id: String,
    pub reason: String,
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidInfo {
        id: String,
        source: ModuleInfoError,
    },
    DuplicateModuleId(String),
    CandidateFault(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInfo { id, source } => {
                write!(f, "invalid module description for `{id}`: {source}")
            }
            Self::DuplicateModuleId(id) => write!(f, "module id already registered: {id}"),
            Self::CandidateFault(message) => write!(f, "module candidate faulted: {message}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInfo { source, .. } => Some(source),
            _ => None,
        }
    }
}

const UNKNOWN_ID: &str = "<unknown>";

/// Id-indexed module registry.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: HashMap<String, ModuleDescriptor>,
    order: Vec<String>,
    skipped: Vec<SkippedModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers one module.
    ///
    /// # Errors
    /// - `InvalidInfo` for a bad id or blank display name.
    /// - `DuplicateModuleId` when the id is already taken.
    /// - `CandidateFault` when the module panics while describing itself.
    pub fn register(&mut self, module: Arc<dyn SuiteModule>) -> Result<(), RegistryError> {
        let described = catch_unwind(AssertUnwindSafe(|| {
            (module.id().trim().to_string(), module.info())
        }));
        let (id, info) = described
            .map_err(|payload| RegistryError::CandidateFault(panic_payload_summary(&*payload)))?;

        validate_module_id(&id).map_err(|source| RegistryError::InvalidInfo {
            id: id.clone(),
            source,
        })?;
        let info = info.normalized().map_err(|source| RegistryError::InvalidInfo {
            id: id.clone(),
            source,
        })?;
        if self.entries.contains_key(id.as_str()) {
            return Err(RegistryError::DuplicateModuleId(id));
        }

        self.order.push(id.clone());
        self.entries.insert(
            id.clone(),
            ModuleDescriptor {
                id,
                info,
                module,
            },
        );
        Ok(())
    }

    /// Registers every candidate that passes validation, in order.
    pub fn discover(candidates: impl IntoIterator<Item = Arc<dyn SuiteModule>>) -> Self {
        let mut registry = Self::new();
        for candidate in candidates {
            let reported_id = catch_unwind(AssertUnwindSafe(|| candidate.id().trim().to_string()))
                .unwrap_or_else(|_| UNKNOWN_ID.to_string());
            match registry.register(candidate) {
                Ok(()) => info!("event=module_registered module={reported_id} status=ok"),
                Err(err) => {
                    warn!("event=module_skipped module={reported_id} status=skipped error={err}");
                    registry.skipped.push(SkippedModule {
                        id: reported_id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        info!(
            "event=discovery_complete module=registry status=ok registered={} skipped={}",
            registry.len(),
            registry.skipped.len()
        );
        registry
    }

    /// Discovers the built-in CRM, projects, forms and reports modules.
    pub fn discover_builtin() -> Self {
        Self::discover(crate::modules::builtin_modules())
    }

    pub fn lookup(&self, module_id: &str) -> Option<&ModuleDescriptor> {
        self.entries.get(module_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn skipped(&self) -> &[SkippedModule] {
        &self.skipped
    }
}
