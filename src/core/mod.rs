//! Snapshot resolution, tolerant decoding and notification fan-out.

pub mod audit;
pub mod category;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod job;
pub mod keys;
pub mod notify;
pub mod snapshot;

pub use audit::{build_tick_record, AuditSink, InMemoryAuditSink, TickRecord};
pub use category::{CategoryCodec, PLACEHOLDER_ICON};
pub use decode::{AmountMap, AmountShape, ToleranceDecoder};
pub use dispatch::{
    DeliveryResult, DeliveryStatus, FailureKind, MulticastMessage, MulticastReport,
    MulticastSender, RecipientStore, RecipientToken,
};
pub use error::{AppResult, RelayError};
pub use job::{PeriodicJob, Spawn};
pub use keys::{FieldKeys, KeyResolver, SharedStore, BUDGETS_FIELD, SPENT_FIELD};
pub use notify::{
    ActivationGate, GateDecision, MessagePool, NotificationScheduler, TickOutcome, TickState,
};
pub use snapshot::{CategoryRow, Snapshot, SnapshotProvider, Timeline};
