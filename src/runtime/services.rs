//! Process-wide relay services.
//!
//! Clients and backends are built once per process and shared. [`install`]
//! checks and initializes under one lock, so concurrent callers observe a
//! single instance; [`teardown`] releases it so a later `install` starts over.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::builders::build_services;
use crate::config::RelayConfig;
use crate::core::{InMemoryAuditSink, MulticastSender, RecipientStore, RelayError, SharedStore};

/// Backends and clients shared by every job and handler in the process.
pub struct RelayServices {
    /// Configuration the services were built from.
    pub config: RelayConfig,
    /// Shared HTTP client.
    pub http: reqwest::Client,
    /// Shared key/value store written by the host app.
    pub store: Arc<dyn SharedStore>,
    /// Registered notification endpoints.
    pub recipients: Arc<dyn RecipientStore>,
    /// Push delivery backend.
    pub sender: Arc<dyn MulticastSender>,
    /// Audit trail of notification ticks.
    pub audit: Arc<Mutex<InMemoryAuditSink>>,
}

static SERVICES: Mutex<Option<Arc<RelayServices>>> = parking_lot::const_mutex(None);

/// Build services from `config` unless already installed; returns the installed instance.
pub fn install(config: &RelayConfig) -> Result<Arc<RelayServices>, RelayError> {
    install_with(|| build_services(config))
}

/// Like [`install`], with a caller-provided constructor.
///
/// `init` runs at most once per installation, while the registry lock is held.
pub fn install_with<F>(init: F) -> Result<Arc<RelayServices>, RelayError>
where
    F: FnOnce() -> Result<RelayServices, RelayError>,
{
    let mut slot = SERVICES.lock();
    if let Some(existing) = slot.as_ref() {
        tracing::debug!("relay services already installed");
        return Ok(Arc::clone(existing));
    }
    let services = Arc::new(init()?);
    *slot = Some(Arc::clone(&services));
    tracing::info!("relay services installed");
    Ok(services)
}

/// Installed services, if any.
pub fn current() -> Option<Arc<RelayServices>> {
    SERVICES.lock().clone()
}

/// Remove the installed services; outstanding handles stay valid.
pub fn teardown() -> Option<Arc<RelayServices>> {
    let previous = SERVICES.lock().take();
    if previous.is_some() {
        tracing::info!("relay services torn down");
    }
    previous
}
