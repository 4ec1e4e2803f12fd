//! Whole-document persistence seam.
//!
//! Both persisted structures (settings and transcript) are monolithic
//! documents re-read and rewritten in full on every access. There is no
//! caching and no locking: concurrent writers race with last-writer-wins
//! semantics. That weak consistency is part of the contract, not an
//! oversight, and any replacement backend must keep it observable.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

/// Load/save a single document wholesale.
///
/// Implementations must not cache: `load` reflects the latest `save` from
/// any writer at the time of the call.
pub trait DocumentStore<D>: Send + Sync {
    fn load(&self) -> Result<D>;
    fn save(&self, doc: &D) -> Result<()>;
}

/// Pretty-printed JSON file, one document per file.
///
/// A missing file loads as `D::default()` so first use does not require a
/// seeding step; the parent directory is created on first save.
pub struct JsonFileStore<D> {
    path: PathBuf,
    _doc: PhantomData<D>,
}

impl<D> JsonFileStore<D> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<D> DocumentStore<D> for JsonFileStore<D>
where
    D: Serialize + DeserializeOwned + Default + Send + Sync,
{
    fn load(&self) -> Result<D> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document file missing, using default");
                Ok(D::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, doc: &D) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral deployments.
pub struct MemoryStore<D> {
    doc: Mutex<D>,
}

impl<D: Default> Default for MemoryStore<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D> MemoryStore<D> {
    pub fn new(doc: D) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

impl<D> DocumentStore<D> for MemoryStore<D>
where
    D: Clone + Send + Sync,
{
    fn load(&self) -> Result<D> {
        Ok(self.doc.lock().unwrap().clone())
    }

    fn save(&self, doc: &D) -> Result<()> {
        *self.doc.lock().unwrap() = doc.clone();
        Ok(())
    }
}
