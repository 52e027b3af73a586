//! Built-in suite modules.
//!
//! # Responsibility
//! - Implement the uniform module contract for CRM, projects, forms and
//!   reports.
//! - Provide the static candidate list the registry discovers at startup.
//!
//! # Invariants
//! - Every mutating action is one locked read-modify-write of the module's
//!   whole document.
//! - Rejected and read-only actions never write the document.

use crate::model::RecordId;
use crate::module::{ActionParseError, ActionReply, ModuleResult, SuiteModule};
use crate::store::{Document, JsonDocumentStore, Mutation};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;

pub mod crm;
pub mod formularios;
pub mod informes;
pub mod proyectos;

pub use crm::CrmModule;
pub use formularios::FormsModule;
pub use informes::ReportsModule;
pub use proyectos::ProjectsModule;

/// Candidates handed to registry discovery, in dashboard order.
pub fn builtin_modules() -> Vec<Arc<dyn SuiteModule>> {
    vec![
        Arc::new(CrmModule),
        Arc::new(ProjectsModule),
        Arc::new(FormsModule),
        Arc::new(ReportsModule),
    ]
}

/// `{id, estado}` payload shared by status-update actions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusChange<S> {
    pub id: RecordId,
    #[serde(rename = "estado")]
    pub status: S,
}

/// `{id}` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordRef {
    pub id: RecordId,
}

/// Runs `apply` inside one locked document update.
///
/// Only `ActionReply::Record` outcomes are persisted.
pub(crate) fn run_action<D: Document>(
    store: &JsonDocumentStore<D>,
    module_id: &str,
    action: &str,
    apply: impl FnOnce(&mut D) -> Result<ActionReply, serde_json::Error>,
) -> ModuleResult<ActionReply> {
    let reply = store.update(|document| match apply(document) {
        Ok(reply @ ActionReply::Record { .. }) => Mutation::Commit(Ok(reply)),
        other => Mutation::Discard(other),
    })??;

    match reply.error() {
        Some(error) => warn!(
            "event=action_rejected module={module_id} status=rejected action={action} error={error}"
        ),
        None => info!("event=action_executed module={module_id} status=ok action={action}"),
    }
    Ok(reply)
}

/// Turns a parse failure into the caller-facing rejection.
pub(crate) fn reject(module_id: &str, err: ActionParseError) -> ActionReply {
    warn!("event=action_rejected module={module_id} status=rejected error={err}");
    err.into()
}

pub(crate) fn count_where<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> u64 {
    items.iter().filter(|item| predicate(item)).count() as u64
}

/// Percentage `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
