//! Persisted forecast model
//!
//! The fitted model is stored as a JSON envelope next to the expenses table.
//! Callers treat the blob as opaque: whatever `save` writes, `load` hands
//! back unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::forecast::{Model, Regressor};

/// Bumped when the envelope layout changes incompatibly
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelEnvelope {
    format_version: u32,
    trained_at: DateTime<Utc>,
    model: Model,
}

/// A model read back from disk
#[derive(Debug, Clone)]
pub struct StoredModel {
    pub model: Model,
    pub trained_at: DateTime<Utc>,
}

/// File-backed store for the latest fitted model
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored model
    pub fn save(&self, model: &Model) -> Result<()> {
        let envelope = ModelEnvelope {
            format_version: MODEL_FORMAT_VERSION,
            trained_at: Utc::now(),
            model: model.clone(),
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), &envelope)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!("Saved {} model to {}", model.kind(), self.path.display());
        Ok(())
    }

    /// Load the stored model, if any
    pub fn load(&self) -> Result<Option<StoredModel>> {
        if !self.path.exists() {
            debug!("No model file at {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let envelope: ModelEnvelope = serde_json::from_str(&content)?;
        if envelope.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidModel(format!(
                "unsupported model format version {} (expected {})",
                envelope.format_version, MODEL_FORMAT_VERSION
            )));
        }

        debug!(
            "Loaded {} model trained at {}",
            envelope.model.kind(),
            envelope.trained_at
        );
        Ok(Some(StoredModel {
            model: envelope.model,
            trained_at: envelope.trained_at,
        }))
    }

    /// Remove the stored model; a missing file is fine
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed model file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
