//! Recipient and multicast-send abstractions for notification fan-out.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::RelayError;

/// Opaque identifier of one notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientToken(pub String);

impl RecipientToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only a prefix ever reaches logs.
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "{prefix}…")
    }
}

/// Payload of one multicast dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastMessage {
    /// Every recipient of this dispatch.
    pub tokens: Vec<RecipientToken>,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}

/// Why delivery to a single token failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FailureKind {
    /// The endpoint is no longer registered.
    Unregistered,
    /// The token is malformed or belongs to another project.
    InvalidToken,
    /// Anything else; worth retrying on a later tick.
    Transient(String),
}

impl FailureKind {
    /// Whether the token should be removed from the recipient set.
    pub const fn is_dead_token(&self) -> bool {
        matches!(self, Self::Unregistered | Self::InvalidToken)
    }
}

/// Per-token delivery result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Accepted by the push service.
    Delivered,
    /// Rejected for this token.
    Failed(FailureKind),
}

/// Result for one token of a multicast send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// Target token.
    pub token: RecipientToken,
    /// Outcome for that token.
    pub status: DeliveryStatus,
}

/// Aggregated outcome of one multicast send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastReport {
    /// One entry per token, in request order.
    pub results: Vec<DeliveryResult>,
}

impl MulticastReport {
    /// Report marking every token delivered.
    pub fn all_delivered(tokens: &[RecipientToken]) -> Self {
        Self {
            results: tokens
                .iter()
                .map(|token| DeliveryResult {
                    token: token.clone(),
                    status: DeliveryStatus::Delivered,
                })
                .collect(),
        }
    }

    /// Number of delivered tokens.
    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == DeliveryStatus::Delivered)
            .count()
    }

    /// Number of failed tokens.
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// Tokens the push service reported as permanently unusable.
    pub fn dead_tokens(&self) -> Vec<RecipientToken> {
        self.results
            .iter()
            .filter(|r| matches!(&r.status, DeliveryStatus::Failed(kind) if kind.is_dead_token()))
            .map(|r| r.token.clone())
            .collect()
    }
}

/// Durable set of registered endpoints, owned by another system.
#[async_trait]
pub trait RecipientStore: Send + Sync {
    /// Read the full current token set. Order is unspecified.
    async fn tokens(&self) -> Result<Vec<RecipientToken>, RelayError>;

    /// Remove the given tokens; returns how many were removed.
    async fn remove(&self, tokens: &[RecipientToken]) -> Result<usize, RelayError>;
}

/// Push service accepting one payload for many tokens.
#[async_trait]
pub trait MulticastSender: Send + Sync {
    /// Send `message` to all of its tokens in a single dispatch.
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastReport, RelayError>;
}
