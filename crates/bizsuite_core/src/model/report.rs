//! Generated report records.
//!
//! Reports are append-only: once stored, a report's content is a frozen
//! snapshot of the statistics at generation time.

use super::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed set of report kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    #[default]
    #[serde(rename = "general")]
    General,
    #[serde(rename = "ventas")]
    Sales,
    #[serde(rename = "proyectos")]
    Projects,
    #[serde(rename = "integracion")]
    Integration,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sales => "ventas",
            Self::Projects => "proyectos",
            Self::Integration => "integracion",
        }
    }

    /// Human-readable title stored inside the report content.
    pub fn title(self) -> &'static str {
        match self {
            Self::General => "General Report",
            Self::Sales => "Sales Report",
            Self::Projects => "Projects Report",
            Self::Integration => "Integration Report",
        }
    }
}

/// Flat counts across all modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralReport {
    #[serde(rename = "tipo")]
    pub title: String,
    #[serde(rename = "clientes_totales")]
    pub total_clients: u64,
    #[serde(rename = "proyectos_totales")]
    pub total_projects: u64,
    #[serde(rename = "formularios_activos")]
    pub active_forms: u64,
    #[serde(rename = "oportunidades_abiertas")]
    pub open_opportunities: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalesReport {
    #[serde(rename = "tipo")]
    pub title: String,
    #[serde(rename = "total_oportunidades")]
    pub total_opportunities: u64,
    #[serde(rename = "valor_pipeline")]
    pub pipeline_value: f64,
    #[serde(rename = "oportunidades_ganadas")]
    pub won_opportunities: u64,
    #[serde(rename = "valor_ganado")]
    pub won_value: f64,
    /// Percentage of opportunities won; 0 when there are none.
    #[serde(rename = "tasa_conversion")]
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectsReport {
    #[serde(rename = "tipo")]
    pub title: String,
    #[serde(rename = "total_proyectos")]
    pub total_projects: u64,
    /// Project count per stored status string.
    #[serde(rename = "estados")]
    pub status_histogram: BTreeMap<String, u64>,
    #[serde(rename = "total_tareas")]
    pub total_tasks: u64,
    #[serde(rename = "horas_estimadas")]
    pub estimated_hours: f64,
    #[serde(rename = "horas_reales")]
    pub actual_hours: f64,
    /// `actual_hours - estimated_hours`.
    #[serde(rename = "desviacion_tiempo")]
    pub hours_deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntegrationReport {
    #[serde(rename = "tipo")]
    pub title: String,
    #[serde(rename = "clientes_totales")]
    pub total_clients: u64,
    #[serde(rename = "clientes_con_proyectos")]
    pub clients_with_projects: u64,
    #[serde(rename = "proyectos_totales")]
    pub total_projects: u64,
    #[serde(rename = "formularios_vinculados_crm")]
    pub forms_linked_to_clients: u64,
    #[serde(rename = "formularios_vinculados_proyectos")]
    pub forms_linked_to_projects: u64,
    /// Percentage of clients with at least one project; 0 when there are none.
    #[serde(rename = "tasa_integracion_clientes")]
    pub integration_rate: f64,
}

/// Computed statistics of one report, shaped by its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportContent {
    General(GeneralReport),
    Sales(SalesReport),
    Projects(ProjectsReport),
    Integration(IntegrationReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: RecordId,
    #[serde(rename = "tipo")]
    pub kind: ReportKind,
    #[serde(rename = "fecha_generacion")]
    pub generated_at: String,
    #[serde(rename = "contenido")]
    pub content: ReportContent,
    #[serde(rename = "generado_por")]
    pub generated_by: String,
}

/// Document stored in `informes.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsDocument {
    #[serde(rename = "informes_generados")]
    pub reports: Vec<Report>,
}
