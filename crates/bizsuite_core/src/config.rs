//! Suite configuration.
//!
//! # Responsibility
//! - Resolve data root and logging settings from the process environment.
//! - Create the shared data directory before any module touches it.
//!
//! # Invariants
//! - `log_level` is always one of `trace|debug|info|warn|error`.
//! - `log_dir`, when set, is absolute.

use crate::context::{ModuleContext, SessionSnapshot};
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming the shared data directory.
pub const ENV_DATA_DIR: &str = "BIZSUITE_DATA_DIR";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "BIZSUITE_LOG_LEVEL";
/// Environment variable enabling file logging into the given directory.
pub const ENV_LOG_DIR: &str = "BIZSUITE_LOG_DIR";

const DEFAULT_DATA_DIR: &str = "data";

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    EmptyDataDir,
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
    CreateDataDir { path: PathBuf, source: io::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data directory must not be empty"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativeLogDir(path) => {
                write!(f, "log directory must be absolute: {}", path.display())
            }
            Self::CreateDataDir { path, source } => write!(
                f,
                "failed to create data directory `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDataDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Process-wide suite settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Directory holding one JSON document per module.
    pub data_dir: PathBuf,
    /// Normalized log level.
    pub log_level: String,
    /// Rolling log directory; `None` keeps logging disabled.
    pub log_dir: Option<PathBuf>,
}

impl SuiteConfig {
    /// Creates a config rooted at `data_dir` with default logging settings.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }

    /// Reads `BIZSUITE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new(read(ENV_DATA_DIR).unwrap_or_else(|| DEFAULT_DATA_DIR.into()));
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config = config.with_log_level(&level)?;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config = config.with_log_dir(dir)?;
        }
        Ok(config)
    }

    /// Replaces the data directory.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.into();
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        self.data_dir = data_dir;
        Ok(self)
    }

    /// Replaces the log level after normalization.
    pub fn with_log_level(mut self, level: &str) -> Result<Self, ConfigError> {
        self.log_level = normalize_level(level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        Ok(self)
    }

    /// Enables file logging in `log_dir`.
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let log_dir = log_dir.into();
        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }
        self.log_dir = Some(log_dir);
        Ok(self)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Creates the data directory if it does not exist yet.
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        std::fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::CreateDataDir {
            path: self.data_dir.clone(),
            source,
        })
    }

    /// Builds a per-request module context over this data root.
    pub fn context(&self, session: SessionSnapshot) -> ModuleContext {
        ModuleContext::new(self.data_dir.clone(), session)
    }
}
