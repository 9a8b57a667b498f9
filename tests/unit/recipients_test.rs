//! Tests for recipient-store backends

use budget_relay::core::{RecipientStore, RecipientToken};
use budget_relay::infra::{InMemoryRecipientStore, JsonlRecipientStore};

#[tokio::test]
async fn test_in_memory_register_and_remove() {
    let store = InMemoryRecipientStore::new();
    assert!(store.register("a"));
    assert!(!store.register("a"));
    assert!(store.register("b"));
    assert_eq!(store.len(), 2);

    let removed = store
        .remove(&[RecipientToken::new("a"), RecipientToken::new("zzz")])
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.tokens().await.unwrap(), vec![RecipientToken::new("b")]);
}

#[tokio::test]
async fn test_jsonl_scan_and_prune() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.jsonl");
    std::fs::write(
        &path,
        concat!(
            "{\"token\": \"t1\"}\nnot json\n",
            "{\"token\": \"t2\", \"platform\": \"android\"}\n\n{\"token\": \"t1\"}\n",
        ),
    )
    .unwrap();

    let store = JsonlRecipientStore::new(&path);
    let mut tokens = store.tokens().await.unwrap();
    tokens.sort();
    assert_eq!(tokens, vec![RecipientToken::new("t1"), RecipientToken::new("t2")]);

    // t1 sits on two lines but is one distinct token.
    let removed = store.remove(&[RecipientToken::new("t1")]).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.tokens().await.unwrap(), vec![RecipientToken::new("t2")]);
}

#[tokio::test]
async fn test_jsonl_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlRecipientStore::new(dir.path().join("absent.jsonl"));
    assert!(store.tokens().await.unwrap().is_empty());
}
