//! Request dispatch boundary.
//!
//! # Responsibility
//! - Route fetch and execute requests to the registered module by id.
//! - Aggregate module summaries into the dashboard envelope.
//!
//! # Invariants
//! - Unknown module ids map to `NotFound`; module faults and panics map to
//!   `Failed` with the underlying message. Neither aborts the caller.
//! - One failing summary becomes an error entry, never a failed dashboard.

use crate::context::{ModuleContext, SessionSnapshot};
use crate::logging::panic_payload_summary;
use crate::model::now_timestamp;
use crate::module::{ActionRequest, ModuleResult};
use crate::registry::{ModuleDescriptor, ModuleRegistry};
use log::{error, warn};
use serde_json::{json, Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Outcome class of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Ok,
    NotFound,
    Failed,
}

impl DispatchStatus {
    /// HTTP-equivalent status code.
    pub fn http_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::Failed => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    pub status: DispatchStatus,
    pub body: Value,
}

impl DispatchResponse {
    fn ok(key: &str, value: Value) -> Self {
        let mut body = Map::new();
        body.insert("ok".to_string(), Value::Bool(true));
        body.insert(key.to_string(), value);
        Self {
            status: DispatchStatus::Ok,
            body: Value::Object(body),
        }
    }

    fn not_found(module_id: &str) -> Self {
        Self {
            status: DispatchStatus::NotFound,
            body: json!({ "ok": false, "error": format!("module not found: {module_id}") }),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            status: DispatchStatus::Failed,
            body: json!({ "ok": false, "error": message }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == DispatchStatus::Ok
    }
}

/// Front controller over a discovered registry.
pub struct Dispatcher<'r> {
    registry: &'r ModuleRegistry,
    data_dir: PathBuf,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r ModuleRegistry, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            data_dir: data_dir.into(),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        self.registry
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `{modules: [{type, name, description, icon, category}]}`.
    pub fn list_modules(&self) -> Value {
        let modules: Vec<Value> = self
            .registry
            .iter()
            .map(|descriptor| {
                let info = descriptor.info();
                json!({
                    "type": descriptor.id(),
                    "name": info.name,
                    "description": info.description,
                    "icon": info.icon,
                    "category": info.category,
                })
            })
            .collect();
        json!({ "modules": modules })
    }

    /// Full document of one module: `{ok, data}`.
    pub fn fetch(&self, module_id: &str, session: &SessionSnapshot) -> DispatchResponse {
        let Some(descriptor) = self.registry.lookup(module_id) else {
            return self.unknown_module(module_id, "fetch");
        };
        let ctx = self.context(session);
        match guarded(|| descriptor.fetch_all(&ctx)) {
            Ok(data) => DispatchResponse::ok("data", data),
            Err(message) => self.failure(module_id, "fetch", message),
        }
    }

    /// Runs an `{action, params}` body: `{ok, result}`.
    ///
    /// Rejected actions still answer `ok`; their `result` carries `error`.
    pub fn execute(
        &self,
        module_id: &str,
        body: &Value,
        session: &SessionSnapshot,
    ) -> DispatchResponse {
        let Some(descriptor) = self.registry.lookup(module_id) else {
            return self.unknown_module(module_id, "execute");
        };
        let ctx = self.context(session);
        let request = ActionRequest::from_body(body);
        match guarded(|| descriptor.execute(&ctx, &request)) {
            Ok(reply) => DispatchResponse::ok("result", reply.to_json()),
            Err(message) => self.failure(module_id, "execute", message),
        }
    }

    /// `{timestamp, modules_summary: [...]}` across every registered module.
    pub fn dashboard(&self, session: &SessionSnapshot) -> Value {
        let ctx = self.context(session);
        let summaries: Vec<Value> = self
            .registry
            .iter()
            .map(|descriptor| summary_entry(descriptor, &ctx))
            .collect();
        json!({
            "timestamp": now_timestamp(),
            "modules_summary": summaries,
        })
    }

    fn context(&self, session: &SessionSnapshot) -> ModuleContext {
        ModuleContext::new(self.data_dir.clone(), session.clone())
    }

    fn unknown_module(&self, module_id: &str, operation: &str) -> DispatchResponse {
        warn!("event=dispatch_not_found module={module_id} status=not_found operation={operation}");
        DispatchResponse::not_found(module_id)
    }

    fn failure(&self, module_id: &str, operation: &str, message: String) -> DispatchResponse {
        error!(
            "event=dispatch_failed module={module_id} status=error operation={operation} error={message}"
        );
        DispatchResponse::failed(message)
    }
}

fn summary_entry(descriptor: &ModuleDescriptor, ctx: &ModuleContext) -> Value {
    let module_id = descriptor.id();
    let name = descriptor.info().name.as_str();
    match guarded(|| descriptor.summarize(ctx)) {
        Ok(summary) => json!({ "module": module_id, "name": name, "summary": summary }),
        Err(message) => {
            warn!(
                "event=dashboard_summary_failed module={module_id} status=error error={message}"
            );
            json!({ "module": module_id, "name": name, "error": message })
        }
    }
}

/// Runs one module operation, folding errors and panics into a message.
fn guarded<T>(operation: impl FnOnce() -> ModuleResult<T>) -> Result<T, String> {
    match catch_unwind(AssertUnwindSafe(operation)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(panic_payload_summary(&*payload)),
    }
}
