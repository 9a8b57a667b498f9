//! In-memory recipient store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{RecipientStore, RecipientToken, RelayError};

/// In-memory token set for development/testing.
#[derive(Default)]
pub struct InMemoryRecipientStore {
    tokens: RwLock<BTreeSet<RecipientToken>>,
}

impl InMemoryRecipientStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `tokens`.
    pub fn with_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: RwLock::new(tokens.into_iter().map(RecipientToken::new).collect()),
        }
    }

    /// Register a token.
    pub fn register(&self, token: impl Into<String>) -> bool {
        self.tokens.write().insert(RecipientToken::new(token))
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    /// True when no token is registered.
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

#[async_trait]
impl RecipientStore for InMemoryRecipientStore {
    async fn tokens(&self) -> Result<Vec<RecipientToken>, RelayError> {
        Ok(self.tokens.read().iter().cloned().collect())
    }

    async fn remove(&self, tokens: &[RecipientToken]) -> Result<usize, RelayError> {
        let mut set = self.tokens.write();
        Ok(tokens.iter().filter(|t| set.remove(*t)).count())
    }
}
