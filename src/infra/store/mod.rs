//! Shared-store backends.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;
