//! Module description record and its validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static MODULE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid module id regex"));

/// Icon used when a module leaves its icon blank.
pub const DEFAULT_ICON: &str = "📦";
/// Category used when a module leaves its category blank.
pub const DEFAULT_CATEGORY: &str = "general";
/// Description used when a module leaves its description blank.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Description record every module publishes to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
}

impl ModuleInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            category: category.into(),
        }
    }

    /// Validates the record and fills blank optional fields with defaults.
    ///
    /// # Errors
    /// - `BlankName` when the display name is empty after trim.
    pub fn normalized(&self) -> Result<Self, ModuleInfoError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ModuleInfoError::BlankName);
        }
        Ok(Self {
            name: name.to_string(),
            description: or_default(&self.description, DEFAULT_DESCRIPTION),
            icon: or_default(&self.icon, DEFAULT_ICON),
            category: or_default(&self.category, DEFAULT_CATEGORY),
        })
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Checks a module identifier (`crm`, `proyectos`, ...).
pub fn validate_module_id(id: &str) -> Result<(), ModuleInfoError> {
    if id.trim().is_empty() {
        return Err(ModuleInfoError::EmptyId);
    }
    if !MODULE_ID_RE.is_match(id) {
        return Err(ModuleInfoError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Description record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleInfoError {
    EmptyId,
    InvalidId(String),
    BlankName,
}

impl Display for ModuleInfoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "module id must not be empty"),
            Self::InvalidId(value) => write!(
                f,
                "module id is invalid: {value} (expected lowercase letters, digits, `_`)"
            ),
            Self::BlankName => write!(f, "module name must not be blank"),
        }
    }
}

impl Error for ModuleInfoError {}
