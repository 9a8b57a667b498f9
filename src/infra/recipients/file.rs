//! JSON-lines recipient store.
//!
//! One `{"token": "..."}` record per line, mirroring a document collection
//! whose records expose a `token` field. Lines that do not parse or lack a
//! usable token are skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{RecipientStore, RecipientToken, RelayError};

#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    #[serde(default)]
    token: Option<String>,
}

/// File-backed recipient store.
pub struct JsonlRecipientStore {
    path: PathBuf,
}

impl JsonlRecipientStore {
    /// Create a store over `path`. A missing file is an empty set.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read_lines(&self) -> Result<Vec<String>, RelayError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(RelayError::Recipients(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn parse_token(line: &str) -> Option<RecipientToken> {
        let record: TokenRecord = serde_json::from_str(line.trim()).ok()?;
        record
            .token
            .filter(|t| !t.trim().is_empty())
            .map(RecipientToken::new)
    }
}

#[async_trait]
impl RecipientStore for JsonlRecipientStore {
    async fn tokens(&self) -> Result<Vec<RecipientToken>, RelayError> {
        let mut seen = HashSet::new();
        Ok(self
            .read_lines()
            .await?
            .iter()
            .filter_map(|line| Self::parse_token(line))
            .filter(|token| seen.insert(token.clone()))
            .collect())
    }

    async fn remove(&self, tokens: &[RecipientToken]) -> Result<usize, RelayError> {
        let dead: HashSet<&RecipientToken> = tokens.iter().collect();
        let lines = self.read_lines().await?;
        // Counted per distinct token; a token on several lines counts once.
        let mut removed = HashSet::new();
        let kept: Vec<String> = lines
            .into_iter()
            .filter(|line| match Self::parse_token(line) {
                Some(token) if dead.contains(&token) => {
                    removed.insert(token);
                    false
                }
                _ => true,
            })
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }

        let mut body = kept.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        // Readers must never observe a partially written file.
        let tmp = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| RelayError::Recipients(format!("cannot write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| {
                RelayError::Recipients(format!("cannot replace {}: {e}", self.path.display()))
            })?;
        Ok(removed.len())
    }
}
