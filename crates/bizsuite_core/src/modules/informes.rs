//! Reports module: cross-module statistics with an append-only history.
//!
//! # Responsibility
//! - Compute the four fixed report kinds from sibling module snapshots.
//! - Append every generated report to the history, never mutating it.
//!
//! # Invariants
//! - Sibling data is read only through `SnapshotSource::export_snapshot`.
//! - Ratios are 0 when their denominator is 0.
//! - A dangling soft reference counts as no match.

use super::{count_where, percentage, reject, run_action};
use super::{CrmModule, FormsModule, ProjectsModule};
use crate::context::ModuleContext;
use crate::model::contact::{CrmDocument, OpportunityStatus};
use crate::model::form::FormsDocument;
use crate::model::project::ProjectsDocument;
use crate::model::report::{
    GeneralReport, IntegrationReport, ProjectsReport, Report, ReportContent, ReportKind,
    ReportsDocument, SalesReport,
};
use crate::model::{next_id, now_timestamp};
use crate::module::{
    ActionParseError, ActionReply, ActionRequest, ModuleInfo, ModuleResult, SnapshotSource,
    SuiteModule,
};
use crate::store::JsonDocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const MODULE_ID: &str = "informes";
pub const STORE_FILE: &str = "informes.json";

/// Placeholder used by the summary when no report exists yet.
pub const NO_REPORT: &str = "None";

const GENERATE_REPORT: &str = "generar_informe";
const LIST_REPORTS: &str = "get_informes";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    #[serde(rename = "tipo")]
    pub kind: ReportKind,
}

/// Typed report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Generate(ReportRequest),
    List,
}

impl ReportAction {
    pub const NAMES: &'static [&'static str] = &[GENERATE_REPORT, LIST_REPORTS];

    pub fn parse(request: &ActionRequest) -> Result<Self, ActionParseError> {
        match request.action.as_str() {
            GENERATE_REPORT => request.params().map(Self::Generate),
            LIST_REPORTS => Ok(Self::List),
            other => Err(ActionParseError::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Generate(_) => GENERATE_REPORT,
            Self::List => LIST_REPORTS,
        }
    }
}

/// Snapshots of the three sibling modules taken at generation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteSnapshot {
    pub crm: CrmDocument,
    pub projects: ProjectsDocument,
    pub forms: FormsDocument,
}

impl SuiteSnapshot {
    /// Reads every sibling document through its read-only export.
    pub fn capture(ctx: &ModuleContext) -> ModuleResult<Self> {
        Ok(Self {
            crm: CrmModule.export_snapshot(ctx)?,
            projects: ProjectsModule.export_snapshot(ctx)?,
            forms: FormsModule.export_snapshot(ctx)?,
        })
    }
}

/// Computes the statistics for one report kind.
pub fn build_report(kind: ReportKind, snapshot: &SuiteSnapshot) -> ReportContent {
    match kind {
        ReportKind::General => ReportContent::General(general_report(snapshot)),
        ReportKind::Sales => ReportContent::Sales(sales_report(&snapshot.crm)),
        ReportKind::Projects => ReportContent::Projects(projects_report(&snapshot.projects)),
        ReportKind::Integration => ReportContent::Integration(integration_report(snapshot)),
    }
}

pub fn general_report(snapshot: &SuiteSnapshot) -> GeneralReport {
    GeneralReport {
        title: ReportKind::General.title().to_string(),
        total_clients: snapshot.crm.clients.len() as u64,
        total_projects: snapshot.projects.projects.len() as u64,
        active_forms: count_where(&snapshot.forms.forms, |f| f.active),
        open_opportunities: count_where(&snapshot.crm.opportunities, |o| o.status.is_pipeline()),
    }
}

pub fn sales_report(crm: &CrmDocument) -> SalesReport {
    let opportunities = &crm.opportunities;
    let won: Vec<_> = opportunities
        .iter()
        .filter(|o| o.status == OpportunityStatus::Won)
        .collect();
    let total = opportunities.len() as u64;

    SalesReport {
        title: ReportKind::Sales.title().to_string(),
        total_opportunities: total,
        pipeline_value: super::crm::pipeline_value(opportunities),
        won_opportunities: won.len() as u64,
        won_value: won.iter().map(|o| o.value).sum(),
        conversion_rate: percentage(won.len() as u64, total),
    }
}

pub fn projects_report(doc: &ProjectsDocument) -> ProjectsReport {
    let mut status_histogram = BTreeMap::new();
    for project in &doc.projects {
        *status_histogram
            .entry(project.status.as_str().to_string())
            .or_insert(0) += 1;
    }
    let estimated_hours: f64 = doc.tasks.iter().map(|t| t.estimated_hours).sum();
    let actual_hours: f64 = doc.tasks.iter().map(|t| t.actual_hours).sum();

    ProjectsReport {
        title: ReportKind::Projects.title().to_string(),
        total_projects: doc.projects.len() as u64,
        status_histogram,
        total_tasks: doc.tasks.len() as u64,
        estimated_hours,
        actual_hours,
        hours_deviation: actual_hours - estimated_hours,
    }
}

pub fn integration_report(snapshot: &SuiteSnapshot) -> IntegrationReport {
    let client_ids: HashSet<_> = snapshot.crm.clients.iter().map(|c| c.id).collect();
    let project_ids: HashSet<_> = snapshot.projects.projects.iter().map(|p| p.id).collect();

    let linked_clients: HashSet<_> = snapshot
        .projects
        .projects
        .iter()
        .filter_map(|p| p.client_id)
        .filter(|id| client_ids.contains(id))
        .collect();
    let forms = &snapshot.forms.forms;
    let total_clients = client_ids.len() as u64;

    IntegrationReport {
        title: ReportKind::Integration.title().to_string(),
        total_clients,
        clients_with_projects: linked_clients.len() as u64,
        total_projects: snapshot.projects.projects.len() as u64,
        forms_linked_to_clients: count_where(forms, |f| {
            f.client_id.is_some_and(|id| client_ids.contains(&id))
        }),
        forms_linked_to_projects: count_where(forms, |f| {
            f.project_id.is_some_and(|id| project_ids.contains(&id))
        }),
        integration_rate: percentage(linked_clients.len() as u64, total_clients),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportsSummary {
    #[serde(rename = "total_informes")]
    pub total_reports: u64,
    #[serde(rename = "tipo_popular")]
    pub most_generated_kind: String,
    #[serde(rename = "ultimo_informe")]
    pub latest_kind: String,
}

impl ReportsSummary {
    pub fn from_document(doc: &ReportsDocument) -> Self {
        let mut counts: HashMap<ReportKind, u64> = HashMap::new();
        let mut first_seen: Vec<ReportKind> = Vec::new();
        for report in &doc.reports {
            let count = counts.entry(report.kind).or_insert(0);
            if *count == 0 {
                first_seen.push(report.kind);
            }
            *count += 1;
        }
        // Ties go to the kind generated first.
        let mut popular: Option<(ReportKind, u64)> = None;
        for kind in first_seen {
            let count = counts.get(&kind).copied().unwrap_or_default();
            if popular.map_or(true, |(_, best)| count > best) {
                popular = Some((kind, count));
            }
        }

        Self {
            total_reports: doc.reports.len() as u64,
            most_generated_kind: popular
                .map_or(NO_REPORT, |(kind, _)| kind.as_str())
                .to_string(),
            latest_kind: doc
                .reports
                .last()
                .map_or(NO_REPORT, |r| r.kind.as_str())
                .to_string(),
        }
    }
}

/// Cross-module reporting module.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportsModule;

impl ReportsModule {
    fn store(ctx: &ModuleContext) -> JsonDocumentStore<ReportsDocument> {
        JsonDocumentStore::open(ctx, STORE_FILE)
    }
}

impl SuiteModule for ReportsModule {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn info(&self) -> ModuleInfo {
        ModuleInfo::new(
            "Reports and Analytics",
            "Generates consolidated reports and analytics across all modules",
            "📊",
            "gestión",
        )
    }

    fn fetch_all(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        Ok(serde_json::to_value(Self::store(ctx).load()?)?)
    }

    fn execute(&self, ctx: &ModuleContext, request: &ActionRequest) -> ModuleResult<ActionReply> {
        let action = match ReportAction::parse(request) {
            Ok(action) => action,
            Err(err) => return Ok(reject(MODULE_ID, err)),
        };
        let store = Self::store(ctx);
        match action {
            ReportAction::Generate(params) => {
                // Siblings are read before taking this module's store lock.
                let snapshot = SuiteSnapshot::capture(ctx)?;
                let content = build_report(params.kind, &snapshot);
                let generated_by = ctx.actor().to_string();
                run_action(&store, MODULE_ID, action.name(), |doc| {
                    let report = Report {
                        id: next_id(&doc.reports),
                        kind: params.kind,
                        generated_at: now_timestamp(),
                        content,
                        generated_by,
                    };
                    let reply = ActionReply::record("informe", &report, "Report generated");
                    doc.reports.push(report);
                    reply
                })
            }
            ReportAction::List => run_action(&store, MODULE_ID, action.name(), |doc| {
                ActionReply::listing("informes", &doc.reports)
            }),
        }
    }

    fn summarize(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        let doc = Self::store(ctx).load()?;
        Ok(serde_json::to_value(ReportsSummary::from_document(&doc))?)
    }
}
