//! Progress file persistence.
//!
//! The store is an explicitly passed handle; the file resource is acquired
//! and released inside each `load`/`save` call. Exactly one process is
//! assumed to hold the backing file at a time — concurrent sessions against
//! the same path have undefined interleaving and are not supported.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::ProgressRecord;

/// Failures from the persistence store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file exists but is not readable as a progress record.
    #[error("corrupt progress file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// A filesystem operation failed.
    #[error("progress file I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Handle to the JSON progress file.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing file.
    ///
    /// An absent file yields a fresh empty record. A file that exists but
    /// does not parse as a progress record is reported as corrupt rather
    /// than silently reset — the caller decides what to do with it.
    pub fn load(&self) -> Result<ProgressRecord, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ProgressRecord::default());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Serialize the record and atomically replace the backing file.
    ///
    /// The record is written to a temporary file in the target directory and
    /// renamed over the destination, so a partially written file is never
    /// visible to a subsequent `load`.
    pub fn save(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.write_all(b"\n"))
            .map_err(|e| StoreError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e.error,
        })?;

        Ok(())
    }
}
