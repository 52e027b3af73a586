//! JSON document storage for module data.
//!
//! # Responsibility
//! - Load and save one module document as a single JSON file.
//! - Serialize in-process read-modify-write cycles per file.
//!
//! # Invariants
//! - A missing file reads as the document's empty default.
//! - Saves replace the file atomically via rename; readers never see a
//!   partially written document.
//! - Two processes writing the same file still race; last writer wins.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod json_store;

pub use json_store::{Document, JsonDocumentStore, Mutation};

pub type StoreResult<T> = Result<T, StoreError>;

/// Document storage failures.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Encode { path: PathBuf, source: serde_json::Error },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "document store I/O failed at `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "document `{}` is not valid: {source}", path.display())
            }
            Self::Encode { path, source } => {
                write!(f, "failed to encode document `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } | Self::Encode { source, .. } => Some(source),
        }
    }
}
