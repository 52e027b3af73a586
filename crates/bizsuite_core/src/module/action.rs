//! Action requests and result descriptors.
//!
//! # Invariants
//! - Unknown actions, bad parameters and missing records never surface as
//!   `Err`: they become `ActionReply::Rejected`, serialized as
//!   `{"error": "..."}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw `{action, params}` body addressed to one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub params: Value,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, params: Value) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }

    /// Reads a request body; missing fields default to `""` and `{}`.
    pub fn from_body(body: &Value) -> Self {
        let action = body
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let params = body.get("params").cloned().unwrap_or(Value::Null);
        Self { action, params }
    }

    /// Decodes `params` into the typed payload of the named action.
    ///
    /// `null` params decode like an empty object.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, ActionParseError> {
        let params = match &self.params {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        serde_json::from_value(params).map_err(|err| ActionParseError::InvalidParams {
            action: self.action.clone(),
            message: err.to_string(),
        })
    }
}

/// Failure to turn an `ActionRequest` into a module's typed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionParseError {
    UnknownAction(String),
    InvalidParams { action: String, message: String },
}

impl std::fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAction(name) => write!(f, "unknown action: {name}"),
            Self::InvalidParams { action, message } => {
                write!(f, "invalid params for {action}: {message}")
            }
        }
    }
}

impl std::error::Error for ActionParseError {}

/// Outcome of one executed action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReply {
    /// One created or mutated record, under its entity key.
    Record {
        key: &'static str,
        record: Value,
        message: String,
    },
    /// Read-only list result, under its collection key.
    Listing { key: &'static str, items: Value },
    /// Soft failure reported to the caller as `{"error": ...}`.
    Rejected { error: String },
}

impl ActionReply {
    pub fn record<T: Serialize>(
        key: &'static str,
        record: &T,
        message: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::Record {
            key,
            record: serde_json::to_value(record)?,
            message: message.into(),
        })
    }

    pub fn listing<T: Serialize>(
        key: &'static str,
        items: &[T],
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::Listing {
            key,
            items: serde_json::to_value(items)?,
        })
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self::Rejected {
            error: error.into(),
        }
    }

    /// `"<entity> not found"` rejection.
    pub fn not_found(entity: &str) -> Self {
        Self::rejected(format!("{entity} not found"))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Rejected { error } => Some(error.as_str()),
            _ => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error().is_some()
    }

    /// JSON shape returned to callers.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        match self {
            Self::Record {
                key,
                record,
                message,
            } => {
                body.insert((*key).to_string(), record.clone());
                body.insert("message".to_string(), Value::String(message.clone()));
            }
            Self::Listing { key, items } => {
                body.insert((*key).to_string(), items.clone());
            }
            Self::Rejected { error } => {
                body.insert("error".to_string(), Value::String(error.clone()));
            }
        }
        Value::Object(body)
    }
}

impl From<ActionParseError> for ActionReply {
    fn from(value: ActionParseError) -> Self {
        Self::rejected(value.to_string())
    }
}
