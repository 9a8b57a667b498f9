//! Probabilistic multicast notification fan-out.
//!
//! One tick walks `Idle → Gating → (Skipped | Dispatching) → Idle`:
//!
//! 1. Gating draws a uniform number in `[0, 1)`; a draw above the activation
//!    probability skips the tick.
//! 2. Dispatching picks one message from the pool, reads every recipient
//!    token and issues exactly one multicast send.
//!
//! Ticks share no state. Any failure ends the tick and is reported as a
//! [`TickOutcome`]; nothing propagates past [`NotificationScheduler::run_tick`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;

use crate::core::audit::{build_tick_record, AuditSink};
use crate::core::dispatch::{MulticastMessage, MulticastSender, RecipientStore, RecipientToken};
use crate::core::job::PeriodicJob;
use crate::core::RelayError;

/// Default chance that a tick dispatches.
pub const DEFAULT_ACTIVATION_PROBABILITY: f64 = 0.30;

/// Default interval between ticks.
pub const DEFAULT_CADENCE: Duration = Duration::from_secs(60 * 60);

/// Default notification title.
pub const DEFAULT_TITLE: &str = "Budget Book 🥔";

/// Built-in message pool.
pub const DEFAULT_MESSAGES: &[&str] = &[
    "Your budget misses you. Log today's spending?",
    "Quick check: did that coffee make it into the book?",
    "Two minutes of logging now saves a surprise later.",
    "Your wallet has notes. Open the app and read them.",
    "Money moves fast. Catch up with it.",
    "A tracked rupee is a rupee that listens.",
    "Receipts in your pocket don't count. Log them!",
    "Small check-ins beat big end-of-month panics.",
    "Your categories are waiting for an update.",
    "Be the boss of your balance today.",
    "Future you says thanks for logging that expense.",
    "Spent something? Say something.",
];

/// Phase of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    /// Waiting for the timer.
    Idle,
    /// Drawing against the activation probability.
    Gating,
    /// Gate closed; nothing else happens this tick.
    Skipped,
    /// Gate open; fetching recipients and sending.
    Dispatching,
}

impl fmt::Display for TickState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Gating => "gating",
            Self::Skipped => "skipped",
            Self::Dispatching => "dispatching",
        };
        f.write_str(label)
    }
}

/// Result of the gate for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// The tick proceeds to dispatch.
    Open {
        /// Uniform draw in `[0, 1)`.
        draw: f64,
    },
    /// The tick is skipped.
    Closed {
        /// Uniform draw in `[0, 1)`.
        draw: f64,
    },
}

impl GateDecision {
    /// Whether the tick proceeds.
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Probabilistic gate in front of every dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationGate {
    probability: f64,
}

impl ActivationGate {
    /// Create a gate; `probability` is clamped to `[0, 1]`.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    /// Configured activation probability.
    pub const fn probability(&self) -> f64 {
        self.probability
    }

    /// A draw above the probability closes the gate.
    pub fn admits(&self, draw: f64) -> bool {
        draw <= self.probability
    }

    /// Draw once from `rng` and decide.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> GateDecision {
        let draw: f64 = rng.random();
        if self.admits(draw) {
            GateDecision::Open { draw }
        } else {
            GateDecision::Closed { draw }
        }
    }
}

impl Default for ActivationGate {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_PROBABILITY)
    }
}

/// Fixed, non-empty pool of notification bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePool {
    messages: Vec<String>,
}

impl MessagePool {
    /// Build a pool; an empty pool is rejected.
    pub fn new(messages: Vec<String>) -> Result<Self, RelayError> {
        if messages.is_empty() {
            return Err(RelayError::Config("message pool must not be empty".into()));
        }
        Ok(Self { messages })
    }

    /// Messages in the pool.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Pick one message uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let index = rng.random_range(0..self.messages.len());
        &self.messages[index]
    }
}

impl Default for MessagePool {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES.iter().map(|m| (*m).to_string()).collect(),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Gate closed.
    Skipped {
        /// Draw that closed the gate.
        draw: f64,
    },
    /// Gate open but the recipient set was empty; no send attempted.
    NoRecipients,
    /// One multicast send was issued.
    Dispatched {
        /// Body that was sent.
        body: String,
        /// Tokens addressed.
        recipients: usize,
        /// Tokens the push service accepted.
        delivered: usize,
        /// Tokens the push service rejected.
        failed: usize,
        /// Dead tokens removed from the recipient store.
        pruned: usize,
    },
    /// Reading the recipient set failed; no send attempted.
    RecipientsFailed(String),
    /// The multicast send itself failed.
    SendFailed(String),
}

impl TickOutcome {
    /// Short label for logs and audit records.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Skipped { .. } => "skipped",
            Self::NoRecipients => "no_recipients",
            Self::Dispatched { .. } => "dispatched",
            Self::RecipientsFailed(_) => "recipients_failed",
            Self::SendFailed(_) => "send_failed",
        }
    }

    /// Whether a multicast send was attempted.
    pub const fn attempted_send(&self) -> bool {
        matches!(self, Self::Dispatched { .. } | Self::SendFailed(_))
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::Skipped { draw } => Some(format!("draw={draw:.4}")),
            Self::NoRecipients => None,
            Self::Dispatched {
                recipients,
                delivered,
                failed,
                pruned,
                ..
            } => Some(format!(
                "recipients={recipients} delivered={delivered} failed={failed} pruned={pruned}"
            )),
            Self::RecipientsFailed(e) | Self::SendFailed(e) => Some(e.clone()),
        }
    }
}

/// Decision taken before any I/O.
enum TickPlan {
    Skip { draw: f64 },
    Dispatch { body: String },
}

/// Hourly probabilistic fan-out job.
pub struct NotificationScheduler {
    recipients: Arc<dyn RecipientStore>,
    sender: Arc<dyn MulticastSender>,
    gate: ActivationGate,
    messages: MessagePool,
    title: String,
    cadence: Duration,
    prune_invalid_tokens: bool,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl NotificationScheduler {
    /// Create a scheduler with default gate, messages, title and cadence.
    pub fn new(recipients: Arc<dyn RecipientStore>, sender: Arc<dyn MulticastSender>) -> Self {
        Self {
            recipients,
            sender,
            gate: ActivationGate::default(),
            messages: MessagePool::default(),
            title: DEFAULT_TITLE.to_string(),
            cadence: DEFAULT_CADENCE,
            prune_invalid_tokens: false,
            audit: None,
        }
    }

    /// Override the activation gate.
    #[must_use]
    pub const fn with_gate(mut self, gate: ActivationGate) -> Self {
        self.gate = gate;
        self
    }

    /// Override the message pool.
    #[must_use]
    pub fn with_messages(mut self, messages: MessagePool) -> Self {
        self.messages = messages;
        self
    }

    /// Override the notification title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the tick cadence.
    #[must_use]
    pub const fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Remove tokens the push service reports as dead after each send.
    #[must_use]
    pub const fn with_token_pruning(mut self, enabled: bool) -> Self {
        self.prune_invalid_tokens = enabled;
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Activation gate in use.
    pub const fn gate(&self) -> &ActivationGate {
        &self.gate
    }

    /// Run one tick using the thread-local RNG.
    pub async fn run_tick(&self) -> TickOutcome {
        let plan = self.plan(&mut rand::rng());
        self.execute(plan).await
    }

    /// Run one tick drawing from `rng`.
    pub async fn run_tick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> TickOutcome {
        let plan = self.plan(rng);
        self.execute(plan).await
    }

    fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> TickPlan {
        transition(TickState::Idle, TickState::Gating);
        match self.gate.roll(rng) {
            GateDecision::Closed { draw } => TickPlan::Skip { draw },
            GateDecision::Open { draw } => {
                tracing::debug!(draw, probability = self.gate.probability(), "gate open");
                TickPlan::Dispatch {
                    body: self.messages.choose(rng).to_string(),
                }
            }
        }
    }

    async fn execute(&self, plan: TickPlan) -> TickOutcome {
        let outcome = match plan {
            TickPlan::Skip { draw } => {
                transition(TickState::Gating, TickState::Skipped);
                tracing::info!(draw, "random skip; not sending this tick");
                TickOutcome::Skipped { draw }
            }
            TickPlan::Dispatch { body } => {
                transition(TickState::Gating, TickState::Dispatching);
                self.dispatch(body).await
            }
        };
        let last = if matches!(outcome, TickOutcome::Skipped { .. }) {
            TickState::Skipped
        } else {
            TickState::Dispatching
        };
        transition(last, TickState::Idle);
        self.record(&outcome);
        outcome
    }

    async fn dispatch(&self, body: String) -> TickOutcome {
        let tokens = match self.recipients.tokens().await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!("failed to read recipients: {e}");
                return TickOutcome::RecipientsFailed(e.to_string());
            }
        };

        if tokens.is_empty() {
            tracing::info!("no recipient tokens registered");
            return TickOutcome::NoRecipients;
        }

        let message = MulticastMessage {
            tokens,
            title: self.title.clone(),
            body,
        };
        let report = match self.sender.send_multicast(&message).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(recipients = message.tokens.len(), "multicast send failed: {e}");
                return TickOutcome::SendFailed(e.to_string());
            }
        };

        let delivered = report.success_count();
        let failed = report.failure_count();
        tracing::info!(
            recipients = message.tokens.len(),
            delivered,
            failed,
            body = %message.body,
            "notification sent"
        );

        let pruned = if self.prune_invalid_tokens {
            self.prune(&report.dead_tokens()).await
        } else {
            0
        };

        TickOutcome::Dispatched {
            body: message.body,
            recipients: message.tokens.len(),
            delivered,
            failed,
            pruned,
        }
    }

    async fn prune(&self, dead: &[RecipientToken]) -> usize {
        if dead.is_empty() {
            return 0;
        }
        match self.recipients.remove(dead).await {
            Ok(removed) => {
                tracing::info!(removed, "pruned dead recipient tokens");
                removed
            }
            Err(e) => {
                tracing::warn!(dead = dead.len(), "failed to prune recipient tokens: {e}");
                0
            }
        }
    }

    fn record(&self, outcome: &TickOutcome) {
        if let Some(audit) = &self.audit {
            audit
                .lock()
                .record(build_tick_record(self.name(), outcome.label(), outcome.detail()));
        }
    }
}

fn transition(from: TickState, to: TickState) {
    tracing::trace!(%from, %to, "notification tick transition");
}

#[async_trait]
impl PeriodicJob for NotificationScheduler {
    fn name(&self) -> &'static str {
        "notification_fanout"
    }

    fn cadence(&self) -> Duration {
        self.cadence
    }

    async fn run_once(&self) {
        let outcome = self.run_tick().await;
        tracing::debug!(outcome = outcome.label(), "notification tick finished");
    }
}
