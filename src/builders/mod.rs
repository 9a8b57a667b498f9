//! Builders to construct relay services from configuration.

pub mod services;

pub use services::{
    build_chat_proxy, build_recipients, build_scheduler, build_sender, build_services,
    build_snapshot_provider, build_store,
};
