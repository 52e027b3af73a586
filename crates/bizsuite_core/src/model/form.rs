//! Dynamic form definitions and submitted responses.

use super::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One input field of a form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// Input widget kind such as `text`, `email` or `select`.
    #[serde(rename = "type", default = "default_field_kind")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

fn default_field_kind() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: RecordId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Ordered as entered.
    #[serde(rename = "campos")]
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "activo")]
    pub active: bool,
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    #[serde(rename = "proyecto_id")]
    pub project_id: Option<RecordId>,
    #[serde(rename = "fecha_creacion")]
    pub created_at: String,
    /// Bumped by every response submitted against this form.
    #[serde(rename = "respuestas_count", default)]
    pub response_count: u64,
}

/// Immutable submission against a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    pub id: RecordId,
    #[serde(rename = "formulario_id")]
    pub form_id: Option<RecordId>,
    /// Field name to submitted value.
    #[serde(rename = "respuestas")]
    pub answers: BTreeMap<String, Value>,
    #[serde(rename = "fecha")]
    pub timestamp: String,
    pub ip: String,
    #[serde(rename = "usuario")]
    pub submitter: String,
}

/// Document stored in `formularios.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsDocument {
    #[serde(rename = "formularios")]
    pub forms: Vec<Form>,
    #[serde(rename = "respuestas")]
    pub responses: Vec<FormResponse>,
}
