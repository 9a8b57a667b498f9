//! Periodic snapshot refresh published to display hosts.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::core::{PeriodicJob, SnapshotProvider, Timeline};
use crate::util::clock::now_ms;

/// Re-reads the shared store on the provider's schedule and publishes each
/// [`Timeline`] on a watch channel.
///
/// Subscribers start with the placeholder, so a host can paint before the
/// first read completes.
pub struct SnapshotRefresher {
    provider: SnapshotProvider,
    publisher: watch::Sender<Timeline>,
}

impl SnapshotRefresher {
    /// Create a refresher seeded with the provider's placeholder.
    pub fn new(provider: SnapshotProvider) -> Self {
        let (publisher, _) = watch::channel(Timeline {
            snapshot: provider.placeholder(),
            refresh_at_ms: now_ms(),
        });
        Self {
            provider,
            publisher,
        }
    }

    /// Receiver observing every published timeline.
    pub fn subscribe(&self) -> watch::Receiver<Timeline> {
        self.publisher.subscribe()
    }

    /// Most recently published timeline.
    pub fn latest(&self) -> Timeline {
        self.publisher.borrow().clone()
    }

    /// Build a new timeline now and publish it.
    pub async fn refresh(&self) -> Timeline {
        let timeline = self.provider.timeline(now_ms()).await;
        tracing::debug!(
            categories = timeline.snapshot.categories().len(),
            refresh_at_ms = %timeline.refresh_at_ms,
            "snapshot refreshed"
        );
        self.publisher.send_replace(timeline.clone());
        timeline
    }
}

#[async_trait]
impl PeriodicJob for SnapshotRefresher {
    fn name(&self) -> &'static str {
        "snapshot_refresh"
    }

    fn cadence(&self) -> Duration {
        let now = now_ms();
        let delta = self.provider.next_refresh_at(now).saturating_sub(now);
        Duration::from_millis(u64::try_from(delta).unwrap_or(u64::MAX))
    }

    fn fires_immediately(&self) -> bool {
        true
    }

    async fn run_once(&self) {
        self.refresh().await;
    }
}
