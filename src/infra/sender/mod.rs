//! Multicast push backends.

pub mod fcm;
pub mod memory;

pub use fcm::FcmSender;
pub use memory::RecordingSender;
