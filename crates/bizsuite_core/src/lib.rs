//! Core of the business suite: module registry, dispatch and the built-in
//! CRM, projects, forms and reports modules.
//! This crate owns every business rule; front ends only route requests.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod module;
pub mod modules;
pub mod registry;
pub mod store;

pub use config::{ConfigError, SuiteConfig};
pub use context::{ModuleContext, SessionSnapshot, DEFAULT_ACTOR};
pub use dispatch::{DispatchResponse, DispatchStatus, Dispatcher};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use module::{
    ActionParseError, ActionReply, ActionRequest, ModuleError, ModuleInfo, ModuleResult,
    SnapshotSource, SuiteModule,
};
pub use modules::{CrmModule, FormsModule, ProjectsModule, ReportsModule};
pub use registry::{ModuleDescriptor, ModuleRegistry, RegistryError, SkippedModule};
pub use store::{JsonDocumentStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
