use crate::models::{profiles_from_export, DocumentError, Profile};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the profile pool
#[derive(Debug, Error)]
pub enum ProfileSourceError {
    #[error("Failed to read profiles from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in profile export: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Supplies the full pool of member profiles for a matching run
pub trait ProfileSource: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<Profile>, ProfileSourceError>;
}

/// Profile source backed by a JSON document export on disk
///
/// The export may be a bare array of profile documents or an object
/// with a `documents` array, as returned by the document store's list API.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    path: PathBuf,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileSource for JsonExportSource {
    fn fetch_all(&self) -> Result<Vec<Profile>, ProfileSourceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| ProfileSourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let export: Value = serde_json::from_str(&raw)?;
        let profiles = profiles_from_export(&export)?;

        tracing::info!("Loaded {} profiles from {}", profiles.len(), self.path.display());

        Ok(profiles)
    }
}
