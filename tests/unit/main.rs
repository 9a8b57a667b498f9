//! Unit tests for individual components

mod builders_test;
mod config_test;
mod decoder_test;
mod error_test;
mod recipients_test;
mod util_test;
