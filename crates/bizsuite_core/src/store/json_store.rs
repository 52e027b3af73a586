//! File-backed JSON document store.

use super::{StoreError, StoreResult};
use crate::context::ModuleContext;
use log::{debug, error};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

static STORE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A module document: fixed named collections of records.
pub trait Document: Serialize + DeserializeOwned + Default {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Default {}

/// Outcome of one read-modify-write closure.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// Persist the modified document and return the value.
    Commit(T),
    /// Leave the file untouched and return the value.
    Discard(T),
}

/// Whole-file JSON store for one module document type.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore<D> {
    path: PathBuf,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> JsonDocumentStore<D> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _document: PhantomData,
        }
    }

    /// Opens the store for `file_name` under the context's data root.
    pub fn open(ctx: &ModuleContext, file_name: &str) -> Self {
        Self::new(ctx.store_path(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the whole document.
    ///
    /// Every call goes to disk; nothing is cached between calls.
    pub fn load(&self) -> StoreResult<D> {
        let started_at = Instant::now();
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "event=store_load module=store status=ok source=default path={}",
                    self.path.display()
                );
                return Ok(D::default());
            }
            Err(source) => {
                error!(
                    "event=store_load module=store status=error path={} error={}",
                    self.path.display(),
                    source
                );
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let document = serde_json::from_str(&raw).map_err(|source| {
            error!(
                "event=store_load module=store status=error path={} error_code=parse_failed error={}",
                self.path.display(),
                source
            );
            StoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        debug!(
            "event=store_load module=store status=ok source=file path={} duration_ms={}",
            self.path.display(),
            started_at.elapsed().as_millis()
        );
        Ok(document)
    }

    /// Writes the whole document, replacing the previous file.
    pub fn save(&self, document: &D) -> StoreResult<()> {
        let started_at = Instant::now();
        let encoded =
            serde_json::to_string_pretty(document).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, encoded).map_err(|source| self.io_error(source))?;
        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            self.io_error(source)
        })?;

        debug!(
            "event=store_save module=store status=ok path={} duration_ms={}",
            self.path.display(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Runs one locked read-modify-write cycle.
    ///
    /// The per-file lock is held from load until the save completes, so
    /// concurrent callers in this process apply their changes one at a time.
    pub fn update<T>(&self, apply: impl FnOnce(&mut D) -> Mutation<T>) -> StoreResult<T> {
        let lock = lock_for(&self.path);
        let _guard = acquire(&lock);

        let mut document = self.load()?;
        match apply(&mut document) {
            Mutation::Commit(value) => {
                self.save(&document)?;
                Ok(value)
            }
            Mutation::Discard(value) => Ok(value),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        error!(
            "event=store_save module=store status=error path={} error={}",
            self.path.display(),
            source
        );
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = acquire(&STORE_LOCKS);
    locks
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

fn acquire<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic inside another holder leaves no partial state behind: the file
    // is only replaced by a completed rename.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
