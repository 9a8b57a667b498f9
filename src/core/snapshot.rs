//! Point-in-time budget snapshots for display surfaces.
//!
//! The display surface runs in its own process and only sees the shared
//! store. Each refresh builds a new [`Snapshot`] from scratch: budgets and
//! spent are read independently and may reflect different writer instants.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::core::category::CategoryCodec;
use crate::core::decode::{AmountMap, ToleranceDecoder};
use crate::core::keys::{FieldKeys, KeyResolver, SharedStore, BUDGETS_FIELD, SPENT_FIELD};
use crate::util::clock::{add_ms, now_ms};

/// Default delay between two refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Default wall-clock limit for one store read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable view of budget state at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Allocated amount per category.
    pub budgets: AmountMap,
    /// Consumed amount per category.
    pub spent: AmountMap,
    /// Observation time in milliseconds since epoch.
    pub observed_at_ms: u128,
}

/// One display row derived from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    /// Full category string as persisted.
    pub category: String,
    /// Emoji part, or the placeholder icon.
    pub icon: String,
    /// Label without the icon.
    pub name: String,
    /// Allocated amount (zero when absent).
    pub budget: f64,
    /// Consumed amount (zero when absent).
    pub spent: f64,
    /// `budget - spent`; negative means overspent.
    pub remaining: f64,
}

impl Snapshot {
    /// Budget for `category`, zero when absent.
    pub fn budget(&self, category: &str) -> f64 {
        self.budgets.get(category).copied().unwrap_or(0.0)
    }

    /// Spent amount for `category`, zero when absent.
    pub fn spent(&self, category: &str) -> f64 {
        self.spent.get(category).copied().unwrap_or(0.0)
    }

    /// Remaining amount for `category`. May be negative.
    pub fn remaining(&self, category: &str) -> f64 {
        self.budget(category) - self.spent(category)
    }

    /// True when neither map has entries.
    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty() && self.spent.is_empty()
    }

    /// Union of categories from both maps, in ascending lexical order.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .budgets
            .keys()
            .chain(self.spent.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Display rows, lexically ordered and capped at `capacity`.
    pub fn rows(&self, capacity: usize) -> Vec<CategoryRow> {
        self.categories()
            .into_iter()
            .take(capacity)
            .map(|category| {
                let (icon, name) = CategoryCodec::split(category);
                CategoryRow {
                    category: category.to_string(),
                    icon,
                    name,
                    budget: self.budget(category),
                    spent: self.spent(category),
                    remaining: self.remaining(category),
                }
            })
            .collect()
    }
}

/// A snapshot paired with the instant its successor should be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Snapshot to display now.
    pub snapshot: Snapshot,
    /// Earliest time (ms since epoch) for the next refresh.
    pub refresh_at_ms: u128,
}

/// Builds snapshots from the shared store.
#[derive(Clone)]
pub struct SnapshotProvider {
    store: Arc<dyn SharedStore>,
    refresh_interval: Duration,
    read_timeout: Duration,
}

impl SnapshotProvider {
    /// Create a provider with default refresh interval and read timeout.
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self {
            store,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the refresh interval.
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Override the read timeout used by [`Self::timeline`].
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Configured refresh interval.
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Empty snapshot for first paint. Performs no I/O.
    #[allow(clippy::unused_self)]
    pub fn placeholder(&self) -> Snapshot {
        Snapshot {
            observed_at_ms: now_ms(),
            ..Snapshot::default()
        }
    }

    /// Read both fields once and stamp the result with the current time.
    ///
    /// Missing, unreadable or malformed fields become empty maps.
    pub async fn current_snapshot(&self) -> Snapshot {
        let budgets = self.read_field(&BUDGETS_FIELD).await;
        let spent = self.read_field(&SPENT_FIELD).await;
        Snapshot {
            budgets,
            spent,
            observed_at_ms: now_ms(),
        }
    }

    /// [`Self::current_snapshot`] bounded by `limit`; the placeholder is
    /// substituted when the limit is exceeded.
    pub async fn current_snapshot_within(&self, limit: Duration) -> Snapshot {
        if let Ok(snapshot) = tokio::time::timeout(limit, self.current_snapshot()).await {
            snapshot
        } else {
            tracing::warn!(
                limit_ms = limit.as_millis(),
                "snapshot read timed out; using placeholder"
            );
            self.placeholder()
        }
    }

    /// Instant of the next refresh: a fixed offset from `now_ms`.
    pub fn next_refresh_at(&self, now_ms: u128) -> u128 {
        add_ms(now_ms, self.refresh_interval)
    }

    /// Bounded snapshot plus the next refresh instant, measured from `now_ms`.
    pub async fn timeline(&self, now_ms: u128) -> Timeline {
        let snapshot = self.current_snapshot_within(self.read_timeout).await;
        Timeline {
            snapshot,
            refresh_at_ms: self.next_refresh_at(now_ms),
        }
    }

    async fn read_field(&self, keys: &FieldKeys) -> AmountMap {
        KeyResolver::resolve(self.store.as_ref(), keys)
            .await
            .map(|raw| ToleranceDecoder::decode(&raw))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(budgets: &[(&str, f64)], spent: &[(&str, f64)]) -> Snapshot {
        Snapshot {
            budgets: budgets.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            spent: spent.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            observed_at_ms: 0,
        }
    }

    #[test]
    fn overspend_is_negative_remaining() {
        let snap = snapshot(&[("🍔 Food", 100.0)], &[("🍔 Food", 140.0)]);
        assert!((snap.remaining("🍔 Food") - -40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_side_defaults_to_zero() {
        let snap = snapshot(&[("Rent", 900.0)], &[("🎬 Movies", 25.0)]);
        assert!((snap.remaining("Rent") - 900.0).abs() < f64::EPSILON);
        assert!((snap.remaining("🎬 Movies") - -25.0).abs() < f64::EPSILON);
        assert!(snap.remaining("unknown").abs() < f64::EPSILON);
    }

    #[test]
    fn rows_are_sorted_deduped_and_capped() {
        let snap = snapshot(
            &[("b", 1.0), ("a", 2.0), ("d", 3.0)],
            &[("a", 1.0), ("c", 1.0)],
        );
        let names: Vec<String> = snap.rows(3).into_iter().map(|r| r.category).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(snap.rows(10).len(), 4);
        assert!(snap.rows(0).is_empty());
    }

    #[test]
    fn rows_split_icons() {
        let snap = snapshot(&[("🍔 Food", 10.0)], &[]);
        let row = &snap.rows(1)[0];
        assert_eq!(row.icon, "🍔");
        assert_eq!(row.name, "Food");
        assert!((row.remaining - 10.0).abs() < f64::EPSILON);
    }
}
