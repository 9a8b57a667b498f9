//! Builders to construct relay services and jobs from configuration.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{
    RecipientBackendConfig, RelayConfig, SenderBackendConfig, StoreBackendConfig,
};
use crate::core::{
    ActivationGate, InMemoryAuditSink, MessagePool, MulticastSender, NotificationScheduler,
    RecipientStore, RelayError, SharedStore, SnapshotProvider,
};
use crate::infra::{
    BearerToken, FcmSender, FileStore, FirestoreRecipientStore, InMemoryRecipientStore,
    InMemoryStore, JsonlRecipientStore, RecordingSender,
};
use crate::runtime::api::{ChatProxy, OpenAiUpstream};
use crate::runtime::services::RelayServices;

/// Shared-store backend for `cfg`.
pub fn build_store(cfg: &StoreBackendConfig) -> Arc<dyn SharedStore> {
    match cfg {
        StoreBackendConfig::InMemory { entries } => {
            Arc::new(InMemoryStore::with_entries(entries.clone()))
        }
        StoreBackendConfig::File { path } => Arc::new(FileStore::new(path)),
    }
}

/// Recipient-store backend for `cfg`.
pub fn build_recipients(
    cfg: &RecipientBackendConfig,
    http: &reqwest::Client,
) -> Arc<dyn RecipientStore> {
    match cfg {
        RecipientBackendConfig::InMemory { tokens } => {
            Arc::new(InMemoryRecipientStore::with_tokens(tokens.clone()))
        }
        RecipientBackendConfig::File { path } => Arc::new(JsonlRecipientStore::new(path)),
        RecipientBackendConfig::Firestore {
            project_id,
            collection,
            access_token_env,
        } => Arc::new(FirestoreRecipientStore::new(
            http.clone(),
            project_id.clone(),
            collection.clone(),
            BearerToken::Env(access_token_env.clone()),
        )),
    }
}

/// Sender backend for `cfg`.
pub fn build_sender(cfg: &SenderBackendConfig, http: &reqwest::Client) -> Arc<dyn MulticastSender> {
    match cfg {
        SenderBackendConfig::InMemory => Arc::new(RecordingSender::new()),
        SenderBackendConfig::Fcm {
            project_id,
            access_token_env,
        } => Arc::new(FcmSender::new(
            http.clone(),
            project_id.clone(),
            BearerToken::Env(access_token_env.clone()),
        )),
    }
}

/// Validate `cfg` and build every shared backend.
pub fn build_services(cfg: &RelayConfig) -> Result<RelayServices, RelayError> {
    cfg.validate()
        .map_err(|e| RelayError::Config(format!("config invalid: {e}")))?;

    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| RelayError::Config(format!("http client: {e}")))?;

    Ok(RelayServices {
        store: build_store(&cfg.store),
        recipients: build_recipients(&cfg.notifications.recipients, &http),
        sender: build_sender(&cfg.notifications.sender, &http),
        audit: Arc::new(Mutex::new(InMemoryAuditSink::new(
            cfg.notifications.audit_capacity,
        ))),
        config: cfg.clone(),
        http,
    })
}

/// Snapshot provider over the shared store.
pub fn build_snapshot_provider(services: &RelayServices) -> SnapshotProvider {
    let cfg = &services.config.snapshot;
    SnapshotProvider::new(Arc::clone(&services.store))
        .with_refresh_interval(cfg.refresh_interval())
        .with_read_timeout(cfg.read_timeout())
}

/// Notification scheduler wired to the shared recipients, sender and audit trail.
pub fn build_scheduler(services: &RelayServices) -> Result<NotificationScheduler, RelayError> {
    let cfg = &services.config.notifications;
    let messages = MessagePool::new(cfg.messages.clone())?;
    Ok(NotificationScheduler::new(
        Arc::clone(&services.recipients),
        Arc::clone(&services.sender),
    )
    .with_gate(ActivationGate::new(cfg.activation_probability))
    .with_messages(messages)
    .with_title(cfg.title.clone())
    .with_cadence(cfg.cadence())
    .with_token_pruning(cfg.prune_invalid_tokens)
    .with_audit(Box::new(Arc::clone(&services.audit))))
}

/// Chat proxy backed by the configured OpenAI-compatible endpoint.
pub fn build_chat_proxy(services: &RelayServices) -> ChatProxy {
    let cfg = &services.config.chat;
    let upstream = OpenAiUpstream::new(
        services.http.clone(),
        cfg.endpoint.clone(),
        cfg.model.clone(),
        BearerToken::Env(cfg.api_key_env.clone()),
    )
    .with_timeout(cfg.timeout());
    ChatProxy::new(Arc::new(upstream), cfg.system_prompt.clone())
}
