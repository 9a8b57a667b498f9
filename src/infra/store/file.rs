//! File-backed shared store.
//!
//! The host application exports its shared preferences as one JSON object of
//! key → value. Values are normally strings holding JSON text; other JSON
//! values are handed on as their serialized text so the decoder can still
//! make sense of them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::{RelayError, SharedStore};

/// Read-only view over a shared preferences JSON file.
///
/// The file is re-read on every call; the writer may replace it at any time.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store over `path`. The file need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Option<Map<String, Value>>, RelayError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RelayError::Store(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str::<Map<String, Value>>(&text)
            .map(Some)
            .map_err(|e| {
                RelayError::Store(format!(
                    "{} is not a JSON object: {e}",
                    self.path.display()
                ))
            })
    }
}

#[async_trait]
impl SharedStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, RelayError> {
        let Some(mut entries) = self.load().await? else {
            return Ok(None);
        };
        Ok(match entries.remove(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }
}
