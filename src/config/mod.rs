//! Configuration models for the store, snapshot refresh, notifications and chat proxy.

pub mod relay;

pub use relay::{
    ChatConfig, NotificationConfig, RecipientBackendConfig, RelayConfig, SenderBackendConfig,
    SnapshotConfig, StoreBackendConfig,
};
