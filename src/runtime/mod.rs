//! Runtime wiring: spawner, periodic driver, snapshot refresh, HTTP surface
//! and the process-wide service registry.

pub mod api;
pub mod driver;
pub mod refresh;
pub mod services;
pub mod tokio_spawner;

pub use api::{
    router, ChatError, ChatProxy, ChatReply, ChatRequest, CompletionUpstream, OpenAiUpstream,
};
pub use driver::{spawn_periodic, JobDriver};
pub use refresh::SnapshotRefresher;
pub use services::RelayServices;
pub use tokio_spawner::TokioSpawner;
