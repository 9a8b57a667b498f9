//! Error types for relay backends.

use thiserror::Error;

/// Errors produced by store, recipient, dispatch and upstream backends.
///
/// None of these escape a background job: the snapshot provider turns them
/// into empty maps and the notification scheduler into a logged tick outcome.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Shared store could not be read.
    #[error("store error: {0}")]
    Store(String),
    /// Recipient collection could not be scanned or updated.
    #[error("recipient store error: {0}")]
    Recipients(String),
    /// Multicast send failed as a whole.
    #[error("dispatch error: {0}")]
    Dispatch(String),
    /// Chat-completion upstream failed.
    #[error("upstream error: {0}")]
    Upstream(String),
    /// Configuration is missing or invalid.
    #[error("config error: {0}")]
    Config(String),
    /// An operation exceeded its execution budget.
    #[error("timed out after {0} ms")]
    Timeout(u128),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
