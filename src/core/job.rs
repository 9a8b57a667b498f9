//! Periodic background job abstraction.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// A best-effort job fired on a fixed cadence.
///
/// `run_once` must not fail: each job absorbs and logs its own errors so a
/// bad tick never stops the driver. The driver awaits one run before arming
/// the next, so runs of the same job never overlap.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use budget_relay::core::PeriodicJob;
/// use std::time::Duration;
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl PeriodicJob for Heartbeat {
///     fn name(&self) -> &'static str { "heartbeat" }
///     fn cadence(&self) -> Duration { Duration::from_secs(60) }
///     async fn run_once(&self) { tracing::info!("alive"); }
/// }
/// ```
#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    /// Name used in logs and audit records.
    fn name(&self) -> &'static str;

    /// Fixed delay between two runs.
    fn cadence(&self) -> Duration;

    /// Whether the first run happens immediately instead of after one cadence.
    fn fires_immediately(&self) -> bool {
        false
    }

    /// Execute a single run.
    async fn run_once(&self);
}

/// Spawner abstraction so drivers stay agnostic of the runtime handle.
pub trait Spawn {
    /// Spawn a detached task.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
