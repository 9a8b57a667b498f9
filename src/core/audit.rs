//! Tick audit trail.
//!
//! Every notification tick can leave one [`TickRecord`] behind. Records are
//! observational only; nothing in the scheduler reads them back.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::clock::now_ms;

/// Audit record for one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickRecord {
    /// Tick identifier (UUID v4).
    pub tick_id: String,
    /// Job that produced the tick.
    pub job: String,
    /// Outcome label (skipped, no_recipients, dispatched, recipients_failed, send_failed).
    pub outcome: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record a tick.
    fn record(&mut self, record: TickRecord);
}

/// Bounded in-memory audit sink; the oldest record is evicted first.
pub struct InMemoryAuditSink {
    records: VecDeque<TickRecord>,
    max_records: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records),
            max_records,
        }
    }

    /// Retrieve a copy of stored records, oldest first.
    pub fn records(&self) -> Vec<TickRecord> {
        self.records.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, record: TickRecord) {
        if self.max_records == 0 {
            return;
        }
        if self.records.len() >= self.max_records {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }
}

/// A shared sink can be attached to a scheduler and still be read elsewhere.
impl<S: AuditSink> AuditSink for Arc<Mutex<S>> {
    fn record(&mut self, record: TickRecord) {
        self.lock().record(record);
    }
}

/// Build a tick record stamped with a fresh id and the current time.
pub fn build_tick_record(
    job: impl Into<String>,
    outcome: impl Into<String>,
    detail: Option<String>,
) -> TickRecord {
    TickRecord {
        tick_id: uuid::Uuid::new_v4().to_string(),
        job: job.into(),
        outcome: outcome.into(),
        created_at_ms: now_ms(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_evicts_oldest() {
        let mut sink = InMemoryAuditSink::new(2);
        for outcome in ["skipped", "dispatched", "no_recipients"] {
            sink.record(build_tick_record("job", outcome, None));
        }
        let outcomes: Vec<String> = sink.records().into_iter().map(|r| r.outcome).collect();
        assert_eq!(outcomes, vec!["dispatched", "no_recipients"]);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut sink = InMemoryAuditSink::new(0);
        sink.record(build_tick_record("job", "skipped", None));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn shared_handle_is_readable() {
        let shared = Arc::new(Mutex::new(InMemoryAuditSink::new(4)));
        let mut writer: Box<dyn AuditSink> = Box::new(Arc::clone(&shared));
        writer.record(build_tick_record("job", "skipped", Some("draw=0.9".into())));
        let records = shared.lock().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].detail.as_deref(), Some("draw=0.9"));
        assert_ne!(records[0].tick_id, build_tick_record("job", "x", None).tick_id);
    }
}
