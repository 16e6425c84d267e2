//! Persistence boundary for generated sets.

use crate::content::GenerationResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to serialize generated set: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Saves a completed generation and returns its storage identifier
#[async_trait]
pub trait GeneratedSetStore: Send + Sync {
    async fn save_generated_set(&self, result: &GenerationResult) -> Result<String, StoreError>;
}

/// Keeps serialized results in memory, keyed by generation id
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<GenerationResult> {
        let sets = self.sets.lock().ok()?;
        serde_json::from_str(sets.get(id)?).ok()
    }

    pub fn len(&self) -> usize {
        self.sets.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GeneratedSetStore for MemoryStore {
    async fn save_generated_set(&self, result: &GenerationResult) -> Result<String, StoreError> {
        let id = result.generation_id.to_string();
        let json = serde_json::to_string(result)?;
        self.sets
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?
            .insert(id.clone(), json);
        Ok(id)
    }
}

/// Writes each result to `<dir>/<generation_id>.json`
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl GeneratedSetStore for JsonDirStore {
    async fn save_generated_set(&self, result: &GenerationResult) -> Result<String, StoreError> {
        let id = result.generation_id.to_string();
        let json = serde_json::to_string_pretty(result)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(format!("{}.json", id));
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!(generation_id = %id, "Saved generated set to {}", path.display());
        Ok(id)
    }
}
