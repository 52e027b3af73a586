//! CRM module: clients, interactions and sales opportunities.

use super::{count_where, reject, run_action, StatusChange};
use crate::context::ModuleContext;
use crate::model::contact::{
    Client, ClientStatus, CrmDocument, Interaction, InteractionKind, Opportunity,
    OpportunityStatus,
};
use crate::model::{next_id, now_timestamp, RecordId};
use crate::module::{
    ActionParseError, ActionReply, ActionRequest, ModuleInfo, ModuleResult, SnapshotSource,
    SuiteModule,
};
use crate::store::JsonDocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MODULE_ID: &str = "crm";
pub const STORE_FILE: &str = "crm_clientes.json";

const ADD_CLIENT: &str = "add_cliente";
const ADD_INTERACTION: &str = "add_contacto";
const ADD_OPPORTUNITY: &str = "add_oportunidad";
const UPDATE_OPPORTUNITY_STATUS: &str = "update_estado_oportunidad";
const UPDATE_CLIENT_STATUS: &str = "update_estado_cliente";

const DEFAULT_PROBABILITY: u8 = 50;
const MAX_PROBABILITY: u8 = 100;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewClient {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "empresa")]
    pub company: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewInteraction {
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    #[serde(rename = "tipo")]
    pub kind: InteractionKind,
    #[serde(rename = "notas")]
    pub notes: String,
}

/// Absent and `null` numbers both fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewOpportunity {
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "valor")]
    pub value: Option<f64>,
    #[serde(rename = "probabilidad")]
    pub probability: Option<u8>,
}

impl NewOpportunity {
    pub fn value(&self) -> f64 {
        self.value.unwrap_or_default()
    }

    pub fn probability(&self) -> u8 {
        self.probability.unwrap_or(DEFAULT_PROBABILITY)
    }

    fn validated(self) -> Result<Self, ActionParseError> {
        if self.probability() > MAX_PROBABILITY {
            return Err(ActionParseError::InvalidParams {
                action: ADD_OPPORTUNITY.to_string(),
                message: format!(
                    "probabilidad must be between 0 and {MAX_PROBABILITY}, got {}",
                    self.probability()
                ),
            });
        }
        Ok(self)
    }
}

/// Typed CRM commands.
#[derive(Debug, Clone, PartialEq)]
pub enum CrmAction {
    AddClient(NewClient),
    AddInteraction(NewInteraction),
    AddOpportunity(NewOpportunity),
    UpdateOpportunityStatus(StatusChange<OpportunityStatus>),
    UpdateClientStatus(StatusChange<ClientStatus>),
}

impl CrmAction {
    pub const NAMES: &'static [&'static str] = &[
        ADD_CLIENT,
        ADD_INTERACTION,
        ADD_OPPORTUNITY,
        UPDATE_OPPORTUNITY_STATUS,
        UPDATE_CLIENT_STATUS,
    ];

    pub fn parse(request: &ActionRequest) -> Result<Self, ActionParseError> {
        match request.action.as_str() {
            ADD_CLIENT => request.params().map(Self::AddClient),
            ADD_INTERACTION => request.params().map(Self::AddInteraction),
            ADD_OPPORTUNITY => request
                .params()
                .and_then(NewOpportunity::validated)
                .map(Self::AddOpportunity),
            UPDATE_OPPORTUNITY_STATUS => request.params().map(Self::UpdateOpportunityStatus),
            UPDATE_CLIENT_STATUS => request.params().map(Self::UpdateClientStatus),
            other => Err(ActionParseError::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AddClient(_) => ADD_CLIENT,
            Self::AddInteraction(_) => ADD_INTERACTION,
            Self::AddOpportunity(_) => ADD_OPPORTUNITY,
            Self::UpdateOpportunityStatus(_) => UPDATE_OPPORTUNITY_STATUS,
            Self::UpdateClientStatus(_) => UPDATE_CLIENT_STATUS,
        }
    }
}

/// Dashboard statistics for the CRM module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmSummary {
    #[serde(rename = "total_clientes")]
    pub total_clients: u64,
    #[serde(rename = "clientes_activos")]
    pub active_clients: u64,
    #[serde(rename = "total_oportunidades")]
    pub total_opportunities: u64,
    #[serde(rename = "oportunidades_abiertas")]
    pub open_opportunities: u64,
    #[serde(rename = "valor_pipeline")]
    pub pipeline_value: f64,
}

impl CrmSummary {
    pub fn from_document(doc: &CrmDocument) -> Self {
        Self {
            total_clients: doc.clients.len() as u64,
            active_clients: count_where(&doc.clients, |c| c.status == ClientStatus::Active),
            total_opportunities: doc.opportunities.len() as u64,
            open_opportunities: count_where(&doc.opportunities, |o| {
                o.status == OpportunityStatus::Open
            }),
            pipeline_value: pipeline_value(&doc.opportunities),
        }
    }
}

/// Sum of value over open and in-progress opportunities.
pub fn pipeline_value(opportunities: &[Opportunity]) -> f64 {
    opportunities
        .iter()
        .filter(|o| o.status.is_pipeline())
        .map(|o| o.value)
        .sum()
}

/// Contact and sales tracking module.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrmModule;

impl CrmModule {
    fn store(ctx: &ModuleContext) -> JsonDocumentStore<CrmDocument> {
        JsonDocumentStore::open(ctx, STORE_FILE)
    }
}

impl SuiteModule for CrmModule {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn info(&self) -> ModuleInfo {
        ModuleInfo::new(
            "CRM - Client Management",
            "Manages clients, contacts and sales opportunities",
            "👥",
            "marketing",
        )
    }

    fn fetch_all(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        Ok(serde_json::to_value(Self::store(ctx).load()?)?)
    }

    fn execute(&self, ctx: &ModuleContext, request: &ActionRequest) -> ModuleResult<ActionReply> {
        let action = match CrmAction::parse(request) {
            Ok(action) => action,
            Err(err) => return Ok(reject(MODULE_ID, err)),
        };
        let name = action.name();
        let actor = ctx.actor().to_string();
        run_action(&Self::store(ctx), MODULE_ID, name, |doc| {
            apply(doc, action, &actor)
        })
    }

    fn summarize(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        let doc = Self::store(ctx).load()?;
        Ok(serde_json::to_value(CrmSummary::from_document(&doc))?)
    }
}

impl SnapshotSource for CrmModule {
    type Snapshot = CrmDocument;

    fn export_snapshot(&self, ctx: &ModuleContext) -> ModuleResult<CrmDocument> {
        Ok(Self::store(ctx).load()?)
    }
}

fn apply(
    doc: &mut CrmDocument,
    action: CrmAction,
    actor: &str,
) -> Result<ActionReply, serde_json::Error> {
    match action {
        CrmAction::AddClient(params) => {
            let client = Client {
                id: next_id(&doc.clients),
                name: params.name,
                email: params.email,
                phone: params.phone,
                company: params.company,
                created_at: now_timestamp(),
                status: ClientStatus::Active,
            };
            let reply = ActionReply::record("cliente", &client, "Client created");
            doc.clients.push(client);
            reply
        }
        CrmAction::AddInteraction(params) => {
            let interaction = Interaction {
                id: next_id(&doc.interactions),
                client_id: params.client_id,
                timestamp: now_timestamp(),
                kind: params.kind,
                notes: params.notes,
                actor: actor.to_string(),
            };
            let reply = ActionReply::record("contacto", &interaction, "Interaction recorded");
            doc.interactions.push(interaction);
            reply
        }
        CrmAction::AddOpportunity(params) => {
            let opportunity = Opportunity {
                id: next_id(&doc.opportunities),
                value: params.value(),
                probability: params.probability(),
                client_id: params.client_id,
                title: params.title,
                status: OpportunityStatus::Open,
                created_at: now_timestamp(),
            };
            let reply = ActionReply::record("oportunidad", &opportunity, "Opportunity created");
            doc.opportunities.push(opportunity);
            reply
        }
        CrmAction::UpdateOpportunityStatus(change) => {
            match doc.opportunities.iter_mut().find(|o| o.id == change.id) {
                Some(opportunity) => {
                    opportunity.status = change.status;
                    ActionReply::record("oportunidad", &*opportunity, "Status updated")
                }
                None => Ok(ActionReply::not_found("opportunity")),
            }
        }
        CrmAction::UpdateClientStatus(change) => {
            match doc.clients.iter_mut().find(|c| c.id == change.id) {
                Some(client) => {
                    client.status = change.status;
                    ActionReply::record("cliente", &*client, "Status updated")
                }
                None => Ok(ActionReply::not_found("client")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{pipeline_value, CrmAction, CrmSummary};
    use crate::model::contact::{CrmDocument, Opportunity, OpportunityStatus};
    use crate::module::{ActionParseError, ActionRequest};
    use serde_json::json;

    fn opportunity(id: u64, value: f64, status: OpportunityStatus) -> Opportunity {
        Opportunity {
            id,
            client_id: None,
            title: format!("deal {id}"),
            value,
            probability: 50,
            status,
            created_at: String::new(),
        }
    }

    #[test]
    fn parse_applies_param_defaults() {
        let request = ActionRequest::new("add_oportunidad", json!({"titulo": "Web"}));
        match CrmAction::parse(&request).expect("known action") {
            CrmAction::AddOpportunity(params) => {
                assert_eq!(params.title, "Web");
                assert_eq!(params.value(), 0.0);
                assert_eq!(params.probability(), 50);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn parse_reads_null_numbers_as_defaults() {
        let request = ActionRequest::new(
            "add_oportunidad",
            json!({"titulo": "Web", "valor": null, "probabilidad": null}),
        );
        match CrmAction::parse(&request).expect("null numbers are accepted") {
            CrmAction::AddOpportunity(params) => {
                assert_eq!(params.value(), 0.0);
                assert_eq!(params.probability(), 50);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_probability_above_one_hundred() {
        let request =
            ActionRequest::new("add_oportunidad", json!({"titulo": "Web", "probabilidad": 150}));
        let err = CrmAction::parse(&request).expect_err("out of range probability");
        assert!(matches!(
            err,
            ActionParseError::InvalidParams { ref action, .. } if action == "add_oportunidad"
        ));
        assert!(err.to_string().contains("between 0 and 100"), "{err}");

        let request =
            ActionRequest::new("add_oportunidad", json!({"titulo": "Web", "probabilidad": 100}));
        assert!(CrmAction::parse(&request).is_ok());
    }

    #[test]
    fn parse_rejects_unknown_status_and_unknown_action() {
        let request =
            ActionRequest::new("update_estado_oportunidad", json!({"id": 1, "estado": "x"}));
        assert!(matches!(
            CrmAction::parse(&request),
            Err(ActionParseError::InvalidParams { .. })
        ));

        let request = ActionRequest::new("delete_cliente", json!({}));
        assert_eq!(
            CrmAction::parse(&request),
            Err(ActionParseError::UnknownAction("delete_cliente".to_string()))
        );
    }

    #[test]
    fn every_listed_name_parses() {
        for name in CrmAction::NAMES {
            let request = ActionRequest::new(*name, json!({"id": 1, "estado": "activo"}));
            let result = CrmAction::parse(&request);
            assert!(
                !matches!(result, Err(ActionParseError::UnknownAction(_))),
                "{name} should be known"
            );
        }
    }

    #[test]
    fn summary_counts_pipeline_over_open_and_in_progress() {
        let doc = CrmDocument {
            opportunities: vec![
                opportunity(1, 100.0, OpportunityStatus::Open),
                opportunity(2, 40.0, OpportunityStatus::InProgress),
                opportunity(3, 50.0, OpportunityStatus::Won),
                opportunity(4, 10.0, OpportunityStatus::Lost),
            ],
            ..CrmDocument::default()
        };
        let summary = CrmSummary::from_document(&doc);
        assert_eq!(summary.total_opportunities, 4);
        assert_eq!(summary.open_opportunities, 1);
        assert_eq!(summary.pipeline_value, 140.0);
        assert_eq!(pipeline_value(&[]), 0.0);
    }
}
