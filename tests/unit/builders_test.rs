//! Tests for building services from configuration

use budget_relay::builders::{build_recipients, build_scheduler, build_services, build_store};
use budget_relay::config::{RecipientBackendConfig, RelayConfig, StoreBackendConfig};
use budget_relay::core::{RecipientStore, RecipientToken, SharedStore, TickOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::test]
async fn test_file_store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, r#"{"categoryBudgets": "{\"Rent\": 900}"}"#).unwrap();

    let store = build_store(&StoreBackendConfig::File { path });
    assert_eq!(
        store.read("categoryBudgets").await.unwrap().as_deref(),
        Some(r#"{"Rent": 900}"#)
    );
}

#[tokio::test]
async fn test_in_memory_recipients_from_config() {
    let recipients = build_recipients(
        &RecipientBackendConfig::InMemory {
            tokens: vec!["b".into(), "a".into()],
        },
        &reqwest::Client::new(),
    );
    assert_eq!(
        recipients.tokens().await.unwrap(),
        vec![RecipientToken::new("a"), RecipientToken::new("b")]
    );
}

#[tokio::test]
async fn test_configured_scheduler_dispatches_and_audits() {
    let mut cfg = RelayConfig::default();
    cfg.notifications.activation_probability = 1.0;
    cfg.notifications.messages = vec!["Log today's spending".into()];
    cfg.notifications.recipients = RecipientBackendConfig::InMemory {
        tokens: vec!["device-1".into()],
    };
    let services = build_services(&cfg).unwrap();
    let scheduler = build_scheduler(&services).unwrap();

    let outcome = scheduler.run_tick_with(&mut StdRng::seed_from_u64(1)).await;
    assert!(matches!(
        outcome,
        TickOutcome::Dispatched { ref body, recipients: 1, .. } if body == "Log today's spending"
    ));
    let records = services.audit.lock().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, "dispatched");
}
