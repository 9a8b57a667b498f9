//! Tests for error types

use budget_relay::core::RelayError;

#[test]
fn test_store_error() {
    let err = RelayError::Store("prefs.json unreadable".to_string());
    assert_eq!(format!("{err}"), "store error: prefs.json unreadable");
}

#[test]
fn test_recipients_error() {
    let err = RelayError::Recipients("403".to_string());
    assert_eq!(format!("{err}"), "recipient store error: 403");
}

#[test]
fn test_dispatch_error() {
    let err = RelayError::Dispatch("no credential".to_string());
    assert_eq!(format!("{err}"), "dispatch error: no credential");
}

#[test]
fn test_timeout_error() {
    let err = RelayError::Timeout(5_000);
    assert_eq!(format!("{err}"), "timed out after 5000 ms");
}

#[test]
fn test_into_anyhow() {
    let err: anyhow::Error = RelayError::Config("bad".to_string()).into();
    assert_eq!(err.to_string(), "config error: bad");
}
