//! Client, interaction and sales-opportunity records.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// Client lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    #[default]
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "inactivo")]
    Inactive,
}

/// Channel of one recorded client interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    #[default]
    #[serde(rename = "llamada")]
    Call,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "reunion", alias = "reunión")]
    Meeting,
}

/// Sales opportunity state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityStatus {
    #[default]
    #[serde(rename = "abierta")]
    Open,
    #[serde(rename = "en_proceso")]
    InProgress,
    #[serde(rename = "ganada")]
    Won,
    #[serde(rename = "perdida")]
    Lost,
}

impl OpportunityStatus {
    /// Open and in-progress opportunities count towards the pipeline.
    pub fn is_pipeline(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "fecha_creacion")]
    pub created_at: String,
    #[serde(rename = "estado", default)]
    pub status: ClientStatus,
}

/// Immutable log entry of a contact with a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: RecordId,
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    #[serde(rename = "fecha")]
    pub timestamp: String,
    #[serde(rename = "tipo")]
    pub kind: InteractionKind,
    #[serde(rename = "notas")]
    pub notes: String,
    #[serde(rename = "usuario")]
    pub actor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: RecordId,
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "valor")]
    pub value: f64,
    #[serde(rename = "probabilidad")]
    pub probability: u8,
    #[serde(rename = "estado", default)]
    pub status: OpportunityStatus,
    #[serde(rename = "fecha_creacion")]
    pub created_at: String,
}

/// Document stored in `crm_clientes.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmDocument {
    #[serde(rename = "clientes")]
    pub clients: Vec<Client>,
    #[serde(rename = "contactos")]
    pub interactions: Vec<Interaction>,
    #[serde(rename = "oportunidades")]
    pub opportunities: Vec<Opportunity>,
}
