//! Per-call module context.
//!
//! A context is built fresh by the dispatcher for every request and handed to
//! module operations by reference. Modules never mutate it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Attribution used when the session carries no user.
pub const DEFAULT_ACTOR: &str = "Sistema";
/// Session key holding the acting user's name.
pub const SESSION_USER_KEY: &str = "usuario";

/// Read-only copy of the caller's session values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSnapshot {
    values: BTreeMap<String, String>,
}

impl SessionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot carrying only the acting user.
    pub fn with_user(user: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(SESSION_USER_KEY.to_string(), user.into());
        Self { values }
    }

    pub fn from_values(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Name recorded in attribution fields such as `usuario` or `generado_por`.
    pub fn actor(&self) -> &str {
        self.get(SESSION_USER_KEY)
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .unwrap_or(DEFAULT_ACTOR)
    }
}

/// Data root plus session snapshot for one module call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContext {
    data_dir: PathBuf,
    session: SessionSnapshot,
}

impl ModuleContext {
    pub fn new(data_dir: impl Into<PathBuf>, session: SessionSnapshot) -> Self {
        Self {
            data_dir: data_dir.into(),
            session,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn session(&self) -> &SessionSnapshot {
        &self.session
    }

    pub fn actor(&self) -> &str {
        self.session.actor()
    }

    /// Location of one module's document under the data root.
    pub fn store_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}
