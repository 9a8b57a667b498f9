//! Tests for configuration parsing and validation

use std::time::Duration;

use budget_relay::config::{
    RecipientBackendConfig, RelayConfig, SenderBackendConfig, StoreBackendConfig,
};

#[test]
fn test_empty_object_is_default_config() {
    let cfg = RelayConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, RelayConfig::default());
    assert_eq!(cfg.snapshot.refresh_interval(), Duration::from_secs(900));
    assert_eq!(cfg.snapshot.read_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.notifications.cadence(), Duration::from_secs(3600));
    assert!((cfg.notifications.activation_probability - 0.30).abs() < f64::EPSILON);
    assert!(!cfg.notifications.prune_invalid_tokens);
    assert_eq!(cfg.chat.api_key_env, "OPENAI_API_KEY");
}

#[test]
fn test_backends_parse() {
    let cfg = RelayConfig::from_json_str(
        r#"{
            "store": {"backend": "file", "path": "/tmp/prefs.json"},
            "notifications": {
                "activation_probability": 0.5,
                "recipients": {"backend": "firestore", "project_id": "budget-app"},
                "sender": {"backend": "fcm", "project_id": "budget-app"}
            }
        }"#,
    )
    .unwrap();
    assert!(matches!(cfg.store, StoreBackendConfig::File { .. }));
    assert_eq!(
        cfg.notifications.recipients,
        RecipientBackendConfig::Firestore {
            project_id: "budget-app".into(),
            collection: "fcmTokens".into(),
            access_token_env: "GOOGLE_OAUTH_ACCESS_TOKEN".into(),
        }
    );
    assert!(matches!(cfg.notifications.sender, SenderBackendConfig::Fcm { .. }));
}

#[test]
fn test_probability_out_of_range() {
    let err = RelayConfig::from_json_str(r#"{"notifications": {"activation_probability": 1.2}}"#)
        .unwrap_err();
    assert!(err.contains("activation_probability"));
}

#[test]
fn test_zero_intervals_rejected() {
    assert!(RelayConfig::from_json_str(r#"{"snapshot": {"refresh_interval_secs": 0}}"#).is_err());
    assert!(RelayConfig::from_json_str(r#"{"snapshot": {"read_timeout_ms": 0}}"#).is_err());
    assert!(RelayConfig::from_json_str(r#"{"notifications": {"cadence_secs": 0}}"#).is_err());
}

#[test]
fn test_empty_pool_and_title_rejected() {
    assert!(RelayConfig::from_json_str(r#"{"notifications": {"messages": []}}"#).is_err());
    assert!(RelayConfig::from_json_str(r#"{"notifications": {"title": "  "}}"#).is_err());
}

#[test]
fn test_remote_backends_need_project() {
    let err = RelayConfig::from_json_str(
        r#"{"notifications": {"sender": {"backend": "fcm", "project_id": ""}}}"#,
    )
    .unwrap_err();
    assert!(err.contains("fcm project_id"));
}

#[test]
fn test_bad_bind_rejected() {
    let err = RelayConfig::from_json_str(r#"{"chat": {"bind": "localhost"}}"#).unwrap_err();
    assert!(err.starts_with("chat:"));
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.json");
    std::fs::write(&path, r#"{"snapshot": {"display_capacity": 3}}"#).unwrap();
    let cfg = RelayConfig::from_path(&path).unwrap();
    assert_eq!(cfg.snapshot.display_capacity, 3);
    assert!(RelayConfig::from_path(dir.path().join("missing.json")).is_err());
}
