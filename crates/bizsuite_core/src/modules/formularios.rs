//! Forms module: dynamic form definitions and their responses.

use super::{count_where, reject, run_action, RecordRef};
use crate::context::ModuleContext;
use crate::model::form::{FieldSpec, Form, FormResponse, FormsDocument};
use crate::model::{next_id, now_timestamp, RecordId};
use crate::module::{
    ActionParseError, ActionReply, ActionRequest, ModuleInfo, ModuleResult, SnapshotSource,
    SuiteModule,
};
use crate::store::JsonDocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const MODULE_ID: &str = "formularios";
pub const STORE_FILE: &str = "formularios.json";

/// Submitter recorded when a response names nobody.
pub const ANONYMOUS_SUBMITTER: &str = "Anónimo";
/// Placeholder reported when no form has any response yet.
pub const NO_POPULAR_FORM: &str = "None";

const CREATE_FORM: &str = "create_formulario";
const SUBMIT_RESPONSE: &str = "submit_respuesta";
const LIST_RESPONSES: &str = "get_respuestas";
const TOGGLE_FORM: &str = "toggle_formulario";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewForm {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "campos")]
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "cliente_id")]
    pub client_id: Option<RecordId>,
    #[serde(rename = "proyecto_id")]
    pub project_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewResponse {
    #[serde(rename = "formulario_id")]
    pub form_id: Option<RecordId>,
    #[serde(rename = "respuestas")]
    pub answers: BTreeMap<String, Value>,
    pub ip: String,
    #[serde(rename = "usuario")]
    pub submitter: String,
}

impl Default for NewResponse {
    fn default() -> Self {
        Self {
            form_id: None,
            answers: BTreeMap::new(),
            ip: String::new(),
            submitter: ANONYMOUS_SUBMITTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseFilter {
    #[serde(rename = "formulario_id")]
    pub form_id: Option<RecordId>,
}

/// Typed form commands.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    CreateForm(NewForm),
    SubmitResponse(NewResponse),
    ListResponses(ResponseFilter),
    ToggleForm(RecordRef),
}

impl FormAction {
    pub const NAMES: &'static [&'static str] =
        &[CREATE_FORM, SUBMIT_RESPONSE, LIST_RESPONSES, TOGGLE_FORM];

    pub fn parse(request: &ActionRequest) -> Result<Self, ActionParseError> {
        match request.action.as_str() {
            CREATE_FORM => request.params().map(Self::CreateForm),
            SUBMIT_RESPONSE => request.params().map(Self::SubmitResponse),
            LIST_RESPONSES => request.params().map(Self::ListResponses),
            TOGGLE_FORM => request.params().map(Self::ToggleForm),
            other => Err(ActionParseError::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateForm(_) => CREATE_FORM,
            Self::SubmitResponse(_) => SUBMIT_RESPONSE,
            Self::ListResponses(_) => LIST_RESPONSES,
            Self::ToggleForm(_) => TOGGLE_FORM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormsSummary {
    #[serde(rename = "total_formularios")]
    pub total_forms: u64,
    #[serde(rename = "formularios_activos")]
    pub active_forms: u64,
    #[serde(rename = "total_respuestas")]
    pub total_responses: u64,
    #[serde(rename = "formulario_popular")]
    pub most_popular_form: String,
    #[serde(rename = "respuestas_popular")]
    pub most_popular_responses: u64,
}

impl FormsSummary {
    pub fn from_document(doc: &FormsDocument) -> Self {
        // Strictly greater keeps the first form on ties.
        let mut popular: Option<&Form> = None;
        for form in &doc.forms {
            let best = popular.map_or(0, |f| f.response_count);
            if form.response_count > best {
                popular = Some(form);
            }
        }

        Self {
            total_forms: doc.forms.len() as u64,
            active_forms: count_where(&doc.forms, |f| f.active),
            total_responses: doc.responses.len() as u64,
            most_popular_form: popular
                .map(|f| f.title.clone())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| NO_POPULAR_FORM.to_string()),
            most_popular_responses: popular.map_or(0, |f| f.response_count),
        }
    }
}

/// Dynamic form collection module.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormsModule;

impl FormsModule {
    fn store(ctx: &ModuleContext) -> JsonDocumentStore<FormsDocument> {
        JsonDocumentStore::open(ctx, STORE_FILE)
    }
}

impl SuiteModule for FormsModule {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn info(&self) -> ModuleInfo {
        ModuleInfo::new(
            "Online Forms",
            "Creates and manages dynamic forms to collect information",
            "📝",
            "oficina",
        )
    }

    fn fetch_all(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        Ok(serde_json::to_value(Self::store(ctx).load()?)?)
    }

    fn execute(&self, ctx: &ModuleContext, request: &ActionRequest) -> ModuleResult<ActionReply> {
        let action = match FormAction::parse(request) {
            Ok(action) => action,
            Err(err) => return Ok(reject(MODULE_ID, err)),
        };
        let name = action.name();
        run_action(&Self::store(ctx), MODULE_ID, name, |doc| apply(doc, action))
    }

    fn summarize(&self, ctx: &ModuleContext) -> ModuleResult<Value> {
        let doc = Self::store(ctx).load()?;
        Ok(serde_json::to_value(FormsSummary::from_document(&doc))?)
    }
}

impl SnapshotSource for FormsModule {
    type Snapshot = FormsDocument;

    fn export_snapshot(&self, ctx: &ModuleContext) -> ModuleResult<FormsDocument> {
        Ok(Self::store(ctx).load()?)
    }
}

fn apply(doc: &mut FormsDocument, action: FormAction) -> Result<ActionReply, serde_json::Error> {
    match action {
        FormAction::CreateForm(params) => {
            let form = Form {
                id: next_id(&doc.forms),
                title: params.title,
                description: params.description,
                fields: params.fields,
                active: true,
                client_id: params.client_id,
                project_id: params.project_id,
                created_at: now_timestamp(),
                response_count: 0,
            };
            let reply = ActionReply::record("formulario", &form, "Form created");
            doc.forms.push(form);
            reply
        }
        FormAction::SubmitResponse(params) => {
            let response = FormResponse {
                id: next_id(&doc.responses),
                form_id: params.form_id,
                answers: params.answers,
                timestamp: now_timestamp(),
                ip: params.ip,
                submitter: params.submitter,
            };
            // Dangling form ids still store the response; only the counter is skipped.
            if let Some(form) = doc
                .forms
                .iter_mut()
                .find(|f| Some(f.id) == response.form_id)
            {
                form.response_count += 1;
            }
            let reply = ActionReply::record("respuesta", &response, "Response saved");
            doc.responses.push(response);
            reply
        }
        FormAction::ListResponses(filter) => {
            let matching: Vec<&FormResponse> = doc
                .responses
                .iter()
                .filter(|r| r.form_id == filter.form_id)
                .collect();
            ActionReply::listing("respuestas", &matching)
        }
        FormAction::ToggleForm(target) => match doc.forms.iter_mut().find(|f| f.id == target.id) {
            Some(form) => {
                form.active = !form.active;
                ActionReply::record("formulario", &*form, "Status updated")
            }
            None => Ok(ActionReply::not_found("form")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{FormsSummary, NO_POPULAR_FORM};
    use crate::model::form::{Form, FormsDocument};

    fn form(id: u64, title: &str, response_count: u64) -> Form {
        Form {
            id,
            title: title.to_string(),
            description: String::new(),
            fields: Vec::new(),
            active: id % 2 == 1,
            client_id: None,
            project_id: None,
            created_at: String::new(),
            response_count,
        }
    }

    #[test]
    fn popular_form_prefers_first_on_ties() {
        let doc = FormsDocument {
            forms: vec![form(1, "Signup", 3), form(2, "Survey", 3), form(3, "Quiz", 1)],
            responses: Vec::new(),
        };
        let summary = FormsSummary::from_document(&doc);
        assert_eq!(summary.most_popular_form, "Signup");
        assert_eq!(summary.most_popular_responses, 3);
        assert_eq!(summary.active_forms, 2);
    }

    #[test]
    fn popular_form_placeholder_without_responses() {
        let doc = FormsDocument {
            forms: vec![form(1, "Signup", 0)],
            responses: Vec::new(),
        };
        let summary = FormsSummary::from_document(&doc);
        assert_eq!(summary.most_popular_form, NO_POPULAR_FORM);
        assert_eq!(summary.most_popular_responses, 0);
    }
}
