//! Projects module: projects, tasks and time tracking.

use super::{count_where, reject, run_action, StatusChange};
use crate::context::ModuleContext;
use crate::model::project::{
    Project, ProjectStatus, ProjectsDocument, Task, TaskPriority, TaskStatus,
};
use crate::model::{next_id, now_timestamp, RecordId};
use crate::module::{
    ActionParseError, ActionReply, ActionRequest, ModuleInfo, ModuleResult, SnapshotSource,
    SuiteModule,
};
use crate::store::JsonDocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MODULE_ID: &str = "proyectos";
pub const STORE_FILE: &str = "proyectos.json";

const ADD_PROJECT: &str = "add_proyecto";
const UPDATE_PROJECT_STATUS: &str = "update_estado_proyecto";
const ADD_TASK: &str = "add_tarea";
const UPDATE_TASK_STATUS: &str = "update_tarea_estado";
const LOG_TIME: &str = "registrar_tiempo";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewProject {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    /// Defaults to the creation time when absent.
    #[serde(rename = "fecha_inicio")]
    pub start_date: Option<String>,
    #[serde(rename = "fecha_fin")]
    pub end_date: Option<String>,
    #[serde(rename = "presupuesto")]
    pub budget: f64,
    #[serde(rename = "responsable")]
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewTask {
    #[serde(rename = "proyecto_id")]
    pub project_id: Option<RecordId>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "prioridad")]
    pub priority: TaskPriority,
    #[serde(rename = "asignado_a")]
    pub assignee: String,
    #[serde(rename = "fecha_vencimiento")]
    pub due_date: Option<String>,
    #[serde(rename = "tiempo_estimado")]
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeEntry {
    pub id: RecordId,
    #[serde(rename = "horas", default)]
    pub hours: f64,
}

/// Typed project commands.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectAction {
    AddProject(NewProject),
    UpdateProjectStatus(StatusChange<ProjectStatus>),
    AddTask(NewTask),
    UpdateTaskStatus(StatusChange<TaskStatus>),
    LogTime(TimeEntry),
}

impl ProjectAction {
    pub const NAMES: &'static [&'static str] = &[
        ADD_PROJECT,
        UPDATE_PROJECT_STATUS,
        ADD_TASK,
        UPDATE_TASK_STATUS,
        LOG_TIME,
    ];

    pub fn parse(request: &ActionRequest) -> Result<Self, ActionParseError> {
        match request.action.as_str() {
            ADD_PROJECT => request.params().map(Self::AddProject),
            UPDATE_PROJECT_STATUS => request.params().map(Self::UpdateProjectStatus),
            ADD_TASK => request.params().map(Self::AddTask),
            UPDATE_TASK_STATUS => request.params().map(Self::UpdateTaskStatus),
            LOG_TIME => request.params().map(Self::LogTime),
            other => Err(ActionParseError::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AddProject(_) => ADD_PROJECT,
            Self::UpdateProjectStatus(_) => UPDATE_PROJECT_STATUS,
            Self::AddTask(_) => ADD_TASK,
            Self::UpdateTaskStatus(_) => UPDATE_TASK_STATUS,
            Self::LogTime(_) => LOG_TIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectsSummary {
    #[serde(rename = "total_proyectos")]
    pub total_projects: u64,
    #[serde(rename = "proyectos_activos")]
    pub active_projects: u64,
    #[serde(rename = "total_tareas")]
    pub total_tasks: u64,
    #[serde(rename = "tareas_pendientes")]
    pub pending_tasks: u64,
    #[serde(rename = "tareas_en_proceso")]
    pub in_progress_tasks: u64,
    #[serde(rename = "tareas_completadas")]
    pub completed_tasks: u64,
    /// Whole percent of completed tasks, rounded down.
    #[serde(rename = "progreso_general")]
    pub overall_progress: u64,
}

impl ProjectsSummary {
    pub fn from_document(doc: &ProjectsDocument) -> Self {
        let total_tasks = doc.tasks.len() as u64;
        let completed_tasks = count_where(&doc.tasks, |t| t.status == TaskStatus::Completed);
        let overall_progress = if total_tasks == 0 {
            0
        } else {
            completed_tasks * 100 / total_tasks
        };
        Self {
            total_projects: doc.projects.len() as u64,
            active_projects: count_where(&doc.projects, |p| p.status.is_active()),
            total_tasks,
            pending_tasks: count_where(&doc.tasks, |t| t.status == TaskStatus::Pending),
            in_progress_tasks: count_where(&doc.tasks, |t| t.status == TaskStatus::InProgress),
            completed_tasks,
            overall_progress,
        }
    }
}

/// Project and task tracking module.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectsModule;

impl ProjectsModule {
    fn store(ctx: &ModuleContext) -> JsonDocumentStore<ProjectsDocument> {
        JsonDocumentStore::open(ctx, STORE_FILE)
    }
}

impl SuiteModule for ProjectsModule {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn info(&self) -> ModuleInfo {
        ModuleInfo::new(
            "Project Management",
            "Organizes projects, tasks and team assignments",
            "📋",
            "proyectos",
        )
    }

    fn fetch_all(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        Ok(serde_json::to_value(Self::store(ctx).load()?)?)
    }

    fn execute(&self, ctx: &ModuleContext, request: &ActionRequest) -> ModuleResult<ActionReply> {
        let action = match ProjectAction::parse(request) {
            Ok(action) => action,
            Err(err) => return Ok(reject(MODULE_ID, err)),
        };
        let name = action.name();
        run_action(&Self::store(ctx), MODULE_ID, name, |doc| apply(doc, action))
    }

    fn summarize(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        let doc = Self::store(ctx).load()?;
        Ok(serde_json::to_value(ProjectsSummary::from_document(&doc))?)
    }
}

impl SnapshotSource for ProjectsModule {
    type Snapshot = ProjectsDocument;

    fn export_snapshot(&self, ctx: &ModuleContext) -> ModuleResult<ProjectsDocument> {
        Ok(Self::store(ctx).load()?)
    }
}

fn apply(
    doc: &mut ProjectsDocument,
    action: ProjectAction,
) -> Result<ActionReply, serde_json::Error> {
    match action {
        ProjectAction::AddProject(params) => {
            let project = Project {
                id: next_id(&doc.projects),
                name: params.name,
                description: params.description,
                client_id: params.client_id,
                status: ProjectStatus::Planning,
                start_date: params.start_date.unwrap_or_else(now_timestamp),
                end_date: params.end_date,
                budget: params.budget,
                owner: params.owner,
            };
            let reply = ActionReply::record("proyecto", &project, "Project created");
            doc.projects.push(project);
            reply
        }
        ProjectAction::UpdateProjectStatus(change) => {
            match doc.projects.iter_mut().find(|p| p.id == change.id) {
                Some(project) => {
                    project.status = change.status;
                    ActionReply::record("proyecto", &*project, "Status updated")
                }
                None => Ok(ActionReply::not_found("project")),
            }
        }
        ProjectAction::AddTask(params) => {
            let task = Task {
                id: next_id(&doc.tasks),
                project_id: params.project_id,
                title: params.title,
                description: params.description,
                status: TaskStatus::Pending,
                priority: params.priority,
                assignee: params.assignee,
                created_at: now_timestamp(),
                due_date: params.due_date,
                estimated_hours: params.estimated_hours,
                actual_hours: 0.0,
                completed_at: None,
            };
            let reply = ActionReply::record("tarea", &task, "Task created");
            doc.tasks.push(task);
            reply
        }
        ProjectAction::UpdateTaskStatus(change) => {
            match doc.tasks.iter_mut().find(|t| t.id == change.id) {
                Some(task) => {
                    task.status = change.status;
                    if change.status == TaskStatus::Completed {
                        task.completed_at = Some(now_timestamp());
                    }
                    ActionReply::record("tarea", &*task, "Status updated")
                }
                None => Ok(ActionReply::not_found("task")),
            }
        }
        ProjectAction::LogTime(entry) => match doc.tasks.iter_mut().find(|t| t.id == entry.id) {
            Some(task) => {
                task.actual_hours += entry.hours;
                ActionReply::record(
                    "tarea",
                    &*task,
                    format!("Registered {} hours", entry.hours),
                )
            }
            None => Ok(ActionReply::not_found("task")),
        },
    }
}
