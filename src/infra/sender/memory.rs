//! Recording sender for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{
    DeliveryResult, DeliveryStatus, FailureKind, MulticastMessage, MulticastReport,
    MulticastSender, RecipientToken, RelayError,
};

/// In-process sender that records every dispatch instead of pushing it.
///
/// Useful for local runs and tests. Individual tokens can be marked as
/// rejected, and the whole sender can be switched into a failing state.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<MulticastMessage>>,
    rejections: Mutex<HashMap<RecipientToken, FailureKind>>,
    outage: Mutex<Option<String>>,
}

impl RecordingSender {
    /// Create a sender that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `kind` for `token` on every later dispatch.
    pub fn reject(&self, token: impl Into<String>, kind: FailureKind) {
        self.rejections
            .lock()
            .insert(RecipientToken::new(token), kind);
    }

    /// Fail every dispatch with `reason` until cleared with `None`.
    pub fn set_outage(&self, reason: Option<String>) {
        *self.outage.lock() = reason;
    }

    /// Messages dispatched so far, oldest first.
    pub fn sent(&self) -> Vec<MulticastMessage> {
        self.sent.lock().clone()
    }

    /// Number of dispatches so far.
    pub fn dispatch_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MulticastSender for RecordingSender {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastReport, RelayError> {
        let outage = self.outage.lock().clone();
        if let Some(reason) = outage {
            return Err(RelayError::Dispatch(reason));
        }
        self.sent.lock().push(message.clone());

        let rejections = self.rejections.lock();
        let results = message
            .tokens
            .iter()
            .map(|token| DeliveryResult {
                token: token.clone(),
                status: rejections
                    .get(token)
                    .cloned()
                    .map_or(DeliveryStatus::Delivered, DeliveryStatus::Failed),
            })
            .collect();
        Ok(MulticastReport { results })
    }
}
