//! Firestore-backed recipient store (REST).
//!
//! Each document in the collection carries a `token` string field. The whole
//! collection is scanned per call, following `nextPageToken` until exhausted.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::{RecipientStore, RecipientToken, RelayError};
use crate::infra::auth::BearerToken;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Fields,
}

#[derive(Debug, Default, Deserialize)]
struct Fields {
    #[serde(default)]
    token: Option<FieldValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(default)]
    string_value: Option<String>,
}

impl Document {
    fn token(&self) -> Option<RecipientToken> {
        self.fields
            .token
            .as_ref()
            .and_then(|v| v.string_value.as_deref())
            .filter(|t| !t.trim().is_empty())
            .map(RecipientToken::new)
    }
}

/// Recipient store reading a Firestore collection over REST.
pub struct FirestoreRecipientStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    credential: BearerToken,
}

impl FirestoreRecipientStore {
    /// Create a store for `collection` in `project_id`.
    pub fn new(
        client: reqwest::Client,
        project_id: impl Into<String>,
        collection: impl Into<String>,
        credential: BearerToken,
    ) -> Self {
        Self {
            client,
            base_url: FIRESTORE_BASE_URL.to_string(),
            project_id: project_id.into(),
            collection: collection.into(),
            credential,
        }
    }

    /// Point at a different API root (emulator or test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.collection
        )
    }

    async fn list_all(&self) -> Result<Vec<Document>, RelayError> {
        let bearer = self.credential.resolve().map_err(RelayError::Recipients)?;
        let url = self.collection_url();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![
                ("pageSize", PAGE_SIZE.to_string()),
                ("mask.fieldPaths", "token".to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&bearer)
                .query(&query)
                .send()
                .await
                .map_err(|e| RelayError::Recipients(format!("firestore list failed: {e}")))?;
            let status = response.status();
            if !status.is_success() {
                return Err(RelayError::Recipients(format!(
                    "firestore list returned {status}"
                )));
            }
            let page: ListDocumentsResponse = response
                .json()
                .await
                .map_err(|e| RelayError::Recipients(format!("firestore list decode failed: {e}")))?;

            documents.extend(page.documents);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            documents = documents.len(),
            collection = %self.collection,
            "scanned recipient collection"
        );
        Ok(documents)
    }
}

#[async_trait]
impl RecipientStore for FirestoreRecipientStore {
    async fn tokens(&self) -> Result<Vec<RecipientToken>, RelayError> {
        let mut seen = HashSet::new();
        Ok(self
            .list_all()
            .await?
            .iter()
            .filter_map(Document::token)
            .filter(|t| seen.insert(t.clone()))
            .collect())
    }

    async fn remove(&self, tokens: &[RecipientToken]) -> Result<usize, RelayError> {
        let dead: HashSet<&RecipientToken> = tokens.iter().collect();
        let bearer = self.credential.resolve().map_err(RelayError::Recipients)?;
        let root = self.base_url.trim_end_matches('/').to_string();

        let mut removed = 0;
        for doc in self.list_all().await? {
            if !doc.token().is_some_and(|t| dead.contains(&t)) {
                continue;
            }
            let response = self
                .client
                .delete(format!("{root}/{}", doc.name))
                .bearer_auth(&bearer)
                .send()
                .await
                .map_err(|e| RelayError::Recipients(format!("firestore delete failed: {e}")))?;
            if response.status().is_success() {
                removed += 1;
            } else {
                tracing::warn!(status = %response.status(), "firestore delete rejected");
            }
        }
        Ok(removed)
    }
}
