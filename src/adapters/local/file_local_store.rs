//! File-based Local Store Adapter
//!
//! One `<key>.json` file per key under a base directory, each holding a JSON
//! array. Saves go through a temp file and a rename so a crash never leaves a
//! half-written list behind.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{LocalStore, PersistenceError};

#[derive(Debug, Clone)]
pub struct FileLocalStore {
    base_path: PathBuf,
}

impl FileLocalStore {
    /// Create a store rooted at `base_path`. The directory is created on
    /// first save.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileLocalStore::new("./data/assistant");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn list_path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.base_path.join(format!("{file}.json"))
    }

    async fn ensure_dir(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| PersistenceError::Local(e.to_string()))
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn load_list(&self, key: &str) -> Result<Vec<Value>, PersistenceError> {
        let path = self.list_path(key);

        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::Local(e.to_string())),
        };

        if json.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&json)?)
    }

    async fn save_list(&self, key: &str, items: &[Value]) -> Result<(), PersistenceError> {
        self.ensure_dir().await?;

        let path = self.list_path(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(items)?;

        fs::write(&tmp, json)
            .await
            .map_err(|e| PersistenceError::Local(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| PersistenceError::Local(e.to_string()))?;

        tracing::debug!(key, items = items.len(), "local list saved");
        Ok(())
    }
}
