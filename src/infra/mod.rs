//! Infrastructure adapters for the shared store, recipient sets and push delivery.

pub mod auth;
pub mod recipients;
pub mod sender;
pub mod store;

pub use auth::BearerToken;
pub use recipients::{FirestoreRecipientStore, InMemoryRecipientStore, JsonlRecipientStore};
pub use sender::{FcmSender, RecordingSender};
pub use store::{FileStore, InMemoryStore};
