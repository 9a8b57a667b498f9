//! Recipient-store backends.

pub mod file;
pub mod firestore;
pub mod memory;

pub use file::JsonlRecipientStore;
pub use firestore::FirestoreRecipientStore;
pub use memory::InMemoryRecipientStore;
