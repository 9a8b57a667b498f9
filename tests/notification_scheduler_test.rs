//! Notification fan-out: gate statistics, recipient handling, pruning and audit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use budget_relay::core::{
    ActivationGate, FailureKind, InMemoryAuditSink, MessagePool, MulticastMessage,
    MulticastReport, MulticastSender, NotificationScheduler, PeriodicJob, RecipientStore,
    RecipientToken, RelayError, TickOutcome,
};
use budget_relay::infra::{InMemoryRecipientStore, RecordingSender};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Sender that only counts calls.
#[derive(Default)]
struct CountingSender {
    calls: AtomicUsize,
}

#[async_trait]
impl MulticastSender for CountingSender {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastReport, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(MulticastReport::all_delivered(&message.tokens))
    }
}

/// Recipient store whose scan always fails.
struct BrokenRecipients;

#[async_trait]
impl RecipientStore for BrokenRecipients {
    async fn tokens(&self) -> Result<Vec<RecipientToken>, RelayError> {
        Err(RelayError::Recipients("collection unavailable".into()))
    }

    async fn remove(&self, _tokens: &[RecipientToken]) -> Result<usize, RelayError> {
        Err(RelayError::Recipients("collection unavailable".into()))
    }
}

fn scheduler_with(
    tokens: &[&str],
    probability: f64,
) -> (NotificationScheduler, Arc<InMemoryRecipientStore>, Arc<RecordingSender>) {
    let recipients = Arc::new(InMemoryRecipientStore::with_tokens(tokens.iter().copied()));
    let sender = Arc::new(RecordingSender::new());
    let scheduler = NotificationScheduler::new(recipients.clone(), sender.clone())
        .with_gate(ActivationGate::new(probability));
    (scheduler, recipients, sender)
}

#[test]
fn gate_activation_rate_matches_probability() {
    let gate = ActivationGate::new(0.30);
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let draws = 100_000;
    let opened = (0..draws).filter(|_| gate.roll(&mut rng).is_open()).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = opened as f64 / f64::from(draws);
    assert!((rate - 0.30).abs() <= 0.02, "activation rate {rate}");
}

#[tokio::test]
async fn empty_recipient_set_never_sends() {
    for probability in [0.0, 1.0] {
        let recipients = Arc::new(InMemoryRecipientStore::new());
        let sender = Arc::new(CountingSender::default());
        let scheduler = NotificationScheduler::new(recipients, sender.clone())
            .with_gate(ActivationGate::new(probability));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let outcome = scheduler.run_tick_with(&mut rng).await;
            assert!(!outcome.attempted_send());
        }
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn open_gate_sends_one_multicast_to_every_token() {
    let (scheduler, _, sender) = scheduler_with(&["tok-a", "tok-b", "tok-c"], 1.0);
    let scheduler = scheduler
        .with_title("Budget Book")
        .with_messages(MessagePool::new(vec!["Check your budget".into()]).unwrap());

    let outcome = scheduler.run_tick_with(&mut StdRng::seed_from_u64(9)).await;
    assert_eq!(
        outcome,
        TickOutcome::Dispatched {
            body: "Check your budget".into(),
            recipients: 3,
            delivered: 3,
            failed: 0,
            pruned: 0,
        }
    );

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Budget Book");
    let mut tokens: Vec<&str> = sent[0].tokens.iter().map(RecipientToken::as_str).collect();
    tokens.sort_unstable();
    assert_eq!(tokens, vec!["tok-a", "tok-b", "tok-c"]);
}

#[tokio::test]
async fn closed_gate_skips_without_io() {
    let (scheduler, _, sender) = scheduler_with(&["tok-a"], 0.0);
    let outcome = scheduler.run_tick_with(&mut StdRng::seed_from_u64(2)).await;
    assert!(matches!(outcome, TickOutcome::Skipped { draw } if draw > 0.0));
    assert_eq!(sender.dispatch_count(), 0);
}

#[tokio::test]
async fn recipient_failure_aborts_tick() {
    let sender = Arc::new(CountingSender::default());
    let scheduler = NotificationScheduler::new(Arc::new(BrokenRecipients), sender.clone())
        .with_gate(ActivationGate::new(1.0));
    let outcome = scheduler.run_tick_with(&mut StdRng::seed_from_u64(4)).await;
    assert!(matches!(outcome, TickOutcome::RecipientsFailed(msg) if msg.contains("unavailable")));
    assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn send_failure_is_reported_and_next_tick_recovers() {
    let (scheduler, _, sender) = scheduler_with(&["tok-a"], 1.0);
    sender.set_outage(Some("push service down".into()));
    let mut rng = StdRng::seed_from_u64(5);

    let outcome = scheduler.run_tick_with(&mut rng).await;
    assert!(matches!(outcome, TickOutcome::SendFailed(_)));

    sender.set_outage(None);
    let outcome = scheduler.run_tick_with(&mut rng).await;
    assert!(matches!(outcome, TickOutcome::Dispatched { delivered: 1, .. }));
}

#[tokio::test]
async fn dead_tokens_are_kept_unless_pruning_is_enabled() {
    let (scheduler, recipients, sender) = scheduler_with(&["live", "gone", "bad"], 1.0);
    sender.reject("gone", FailureKind::Unregistered);
    sender.reject("bad", FailureKind::InvalidToken);
    let mut rng = StdRng::seed_from_u64(6);

    let outcome = scheduler.run_tick_with(&mut rng).await;
    assert!(matches!(outcome, TickOutcome::Dispatched { delivered: 1, failed: 2, pruned: 0, .. }));
    assert_eq!(recipients.len(), 3);

    let scheduler = scheduler.with_token_pruning(true);
    let outcome = scheduler.run_tick_with(&mut rng).await;
    assert!(matches!(outcome, TickOutcome::Dispatched { pruned: 2, .. }));
    assert_eq!(recipients.tokens().await.unwrap(), vec![RecipientToken::new("live")]);
}

#[tokio::test]
async fn transient_failures_are_never_pruned() {
    let (scheduler, recipients, sender) = scheduler_with(&["a", "b"], 1.0);
    sender.reject("b", FailureKind::Transient("503".into()));
    let scheduler = scheduler.with_token_pruning(true);
    let outcome = scheduler.run_tick_with(&mut StdRng::seed_from_u64(8)).await;
    assert!(matches!(outcome, TickOutcome::Dispatched { failed: 1, pruned: 0, .. }));
    assert_eq!(recipients.len(), 2);
}

#[tokio::test]
async fn every_tick_is_audited() {
    let audit = Arc::new(Mutex::new(InMemoryAuditSink::new(16)));
    let (scheduler, _, _) = scheduler_with(&[], 1.0);
    let scheduler = scheduler.with_audit(Box::new(audit.clone()));

    scheduler.run_tick_with(&mut StdRng::seed_from_u64(10)).await;
    scheduler.run_once().await;

    let records = audit.lock().records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.job == "notification_fanout"));
    assert!(records.iter().all(|r| r.outcome == "no_recipients"));
    assert_ne!(records[0].tick_id, records[1].tick_id);
}

#[test]
fn scheduler_defaults() {
    let (scheduler, _, _) = scheduler_with(&[], 0.30);
    assert_eq!(scheduler.name(), "notification_fanout");
    assert_eq!(scheduler.cadence(), std::time::Duration::from_secs(3600));
    assert!(!scheduler.fires_immediately());
}

#[test]
fn outcome_serializes_with_tag() {
    let json = serde_json::to_value(TickOutcome::NoRecipients).unwrap();
    assert_eq!(json, serde_json::json!({"outcome": "no_recipients"}));
}
