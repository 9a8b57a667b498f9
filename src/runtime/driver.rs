//! Drives [`PeriodicJob`]s on their cadence until shut down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::core::{PeriodicJob, Spawn};

const MIN_CADENCE: Duration = Duration::from_millis(1);

/// Owns the shutdown signal shared by every job it started.
///
/// Dropping the driver stops its jobs as well.
pub struct JobDriver<S: Spawn> {
    spawner: S,
    shutdown: watch::Sender<bool>,
}

impl<S: Spawn> JobDriver<S> {
    /// Create a driver placing jobs on `spawner`.
    pub fn new(spawner: S) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { spawner, shutdown }
    }

    /// Start `job` in the background.
    pub fn start(&self, job: Arc<dyn PeriodicJob>) {
        spawn_periodic(&self.spawner, job, self.shutdown.subscribe());
    }

    /// Signal every started job to stop after its current run.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Run `job` on a fixed cadence until `shutdown` turns true or its sender drops.
///
/// Each run is awaited before the next tick is taken, so runs of one job never
/// overlap; ticks missed during a long run are skipped rather than bunched.
pub fn spawn_periodic<S: Spawn>(
    spawner: &S,
    job: Arc<dyn PeriodicJob>,
    mut shutdown: watch::Receiver<bool>,
) {
    spawner.spawn(async move {
        let cadence = job.cadence().max(MIN_CADENCE);
        let start = if job.fires_immediately() {
            Instant::now()
        } else {
            Instant::now() + cadence
        };
        let mut ticker = tokio::time::interval_at(start, cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(job = job.name(), cadence_secs = cadence.as_secs(), "periodic job started");

        loop {
            tokio::select! {
                _ = ticker.tick() => job.run_once().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(job = job.name(), "periodic job stopped");
    });
}
