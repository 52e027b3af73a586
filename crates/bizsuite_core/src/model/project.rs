//! Project and task records.

use super::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "planificacion")]
    Planning,
    #[serde(rename = "en_proceso")]
    InProgress,
    #[serde(rename = "completado")]
    Completed,
}

impl ProjectStatus {
    /// Stored string form, also used as histogram key in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planificacion",
            Self::InProgress => "en_proceso",
            Self::Completed => "completado",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Planning | Self::InProgress)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_proceso")]
    InProgress,
    #[serde(rename = "completada")]
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(rename = "baja")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Soft reference into the CRM client list.
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    #[serde(rename = "estado", default)]
    pub status: ProjectStatus,
    #[serde(rename = "fecha_inicio")]
    pub start_date: String,
    #[serde(rename = "fecha_fin")]
    pub end_date: Option<String>,
    #[serde(rename = "presupuesto")]
    pub budget: f64,
    #[serde(rename = "responsable")]
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    #[serde(rename = "proyecto_id")]
    pub project_id: Option<RecordId>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "estado", default)]
    pub status: TaskStatus,
    #[serde(rename = "prioridad", default)]
    pub priority: TaskPriority,
    #[serde(rename = "asignado_a")]
    pub assignee: String,
    #[serde(rename = "fecha_creacion")]
    pub created_at: String,
    #[serde(rename = "fecha_vencimiento")]
    pub due_date: Option<String>,
    /// Hours.
    #[serde(rename = "tiempo_estimado", default)]
    pub estimated_hours: f64,
    /// Hours, accumulated by `registrar_tiempo`.
    #[serde(rename = "tiempo_real", default)]
    pub actual_hours: f64,
    #[serde(
        rename = "fecha_completada",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<String>,
}

/// Document stored in `proyectos.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsDocument {
    #[serde(rename = "proyectos")]
    pub projects: Vec<Project>,
    #[serde(rename = "tareas")]
    pub tasks: Vec<Task>,
}
