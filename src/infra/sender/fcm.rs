//! Firebase Cloud Messaging HTTP v1 sender.
//!
//! HTTP v1 has no batch endpoint, so a multicast is one request per token,
//! issued sequentially. Per-token errors are classified into
//! [`FailureKind`]s; only a missing credential fails the whole dispatch.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::core::{
    DeliveryResult, DeliveryStatus, FailureKind, MulticastMessage, MulticastReport,
    MulticastSender, RecipientToken, RelayError,
};
use crate::infra::auth::BearerToken;

const FCM_BASE_URL: &str = "https://fcm.googleapis.com/v1";

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    #[serde(default)]
    error_code: Option<String>,
}

/// Map an FCM error response to a per-token failure.
pub fn classify_failure(status: u16, body: &str) -> FailureKind {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error_code = envelope
        .error
        .details
        .iter()
        .find_map(|d| d.error_code.as_deref())
        .unwrap_or(envelope.error.status.as_str());

    match (status, error_code) {
        (_, "UNREGISTERED") | (404, _) => FailureKind::Unregistered,
        (400, "INVALID_ARGUMENT") | (_, "SENDER_ID_MISMATCH") => FailureKind::InvalidToken,
        _ if envelope.error.message.is_empty() => FailureKind::Transient(format!("http {status}")),
        _ => FailureKind::Transient(format!("http {status}: {}", envelope.error.message)),
    }
}

/// Sender posting to the FCM HTTP v1 API.
pub struct FcmSender {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    credential: BearerToken,
}

impl FcmSender {
    /// Create a sender for `project_id`.
    pub fn new(
        client: reqwest::Client,
        project_id: impl Into<String>,
        credential: BearerToken,
    ) -> Self {
        Self {
            client,
            base_url: FCM_BASE_URL.to_string(),
            project_id: project_id.into(),
            credential,
        }
    }

    /// Point at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn send_url(&self) -> String {
        format!(
            "{}/projects/{}/messages:send",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    async fn send_one(
        &self,
        url: &str,
        bearer: &str,
        token: &RecipientToken,
        message: &MulticastMessage,
    ) -> DeliveryStatus {
        let payload = json!({
            "message": {
                "token": token.as_str(),
                "notification": { "title": message.title, "body": message.body },
            }
        });
        let response = match self.client.post(url).bearer_auth(bearer).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => return DeliveryStatus::Failed(FailureKind::Transient(e.to_string())),
        };
        let status = response.status();
        if status.is_success() {
            return DeliveryStatus::Delivered;
        }
        let body = response.text().await.unwrap_or_default();
        let kind = classify_failure(status.as_u16(), &body);
        tracing::debug!(token = %token, status = %status, failure = ?kind, "fcm rejected token");
        DeliveryStatus::Failed(kind)
    }
}

#[async_trait]
impl MulticastSender for FcmSender {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastReport, RelayError> {
        let bearer = self.credential.resolve().map_err(RelayError::Dispatch)?;
        let url = self.send_url();

        let mut results = Vec::with_capacity(message.tokens.len());
        for token in &message.tokens {
            let status = self.send_one(&url, &bearer, token, message).await;
            results.push(DeliveryResult {
                token: token.clone(),
                status,
            });
        }
        Ok(MulticastReport { results })
    }
}
