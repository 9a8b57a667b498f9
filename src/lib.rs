//! # Budget Relay
//!
//! Budget snapshots and notification fan-out for a personal budgeting app.
//!
//! The host application writes two JSON maps into a shared key/value store:
//! the budget allocated per category and the amount spent per category. This
//! crate is the read side of that store plus the server-side pieces that sit
//! next to it:
//!
//! - **Snapshots**: [`core::SnapshotProvider`] resolves each field through a
//!   list of legacy key names, decodes it tolerantly (malformed entries are
//!   dropped, never fatal) and produces an immutable [`core::Snapshot`] with a
//!   fixed next-refresh instant. Reads are bounded; a slow store yields the
//!   placeholder instead of blocking a display host.
//! - **Fan-out**: [`core::NotificationScheduler`] runs once per cadence, passes
//!   a random activation gate, picks one message from a fixed pool and sends
//!   it to every registered recipient in one multicast.
//! - **Chat proxy**: a small axum service forwarding budgeting questions to
//!   an OpenAI-compatible completion endpoint ([`runtime::api`]).
//!
//! ## Snapshot
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use budget_relay::core::SnapshotProvider;
//! use budget_relay::infra::InMemoryStore;
//!
//! let store = Arc::new(InMemoryStore::with_entries([
//!     ("categoryBudgets", r#"{"🍔 Food": 100}"#),
//!     ("categorySpent", r#"{"🍔 Food": 140}"#),
//! ]));
//! let snapshot = SnapshotProvider::new(store).current_snapshot().await;
//! assert_eq!(snapshot.remaining("🍔 Food"), -40.0);
//! ```
//!
//! ## Fan-out
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use budget_relay::core::{NotificationScheduler, PeriodicJob};
//! use budget_relay::infra::{InMemoryRecipientStore, RecordingSender};
//! use budget_relay::runtime::{JobDriver, TokioSpawner};
//!
//! let scheduler = NotificationScheduler::new(
//!     Arc::new(InMemoryRecipientStore::with_tokens(["device-token"])),
//!     Arc::new(RecordingSender::new()),
//! );
//! let driver = JobDriver::new(TokioSpawner::try_current()?);
//! driver.start(Arc::new(scheduler));
//! ```
//!
//! The `budget-relay` binary wires everything from a JSON configuration file
//! (see [`config::RelayConfig`]).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Snapshot resolution, tolerant decoding and notification fan-out.
pub mod core;
/// Configuration models for backends, refresh and fan-out.
pub mod config;
/// Builders to construct relay services from configuration.
pub mod builders;
/// Infrastructure adapters for the shared store, recipients and push delivery.
pub mod infra;
/// Runtime wiring and HTTP surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
