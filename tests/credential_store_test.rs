use std::sync::Arc;

use colloquy::application::ports::CredentialStore;
use colloquy::application::services::{
    ApiKeyResolver, CREDENTIAL_UNAVAILABLE_MESSAGE, DECRYPT_FAILED_MESSAGE, NO_API_KEY_MESSAGE,
};
use colloquy::domain::UserId;
use colloquy::infrastructure::crypto::Base64Cipher;
use colloquy::infrastructure::persistence::JsonCredentialStore;
use tempfile::TempDir;

fn setup() -> (TempDir, Arc<JsonCredentialStore>, UserId) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonCredentialStore::new(dir.path(), Arc::new(Base64Cipher)));
    (dir, store, UserId::from(7u64))
}

#[tokio::test]
async fn given_stored_key_when_loading_then_plaintext_returned_and_file_is_sealed() {
    let (dir, store, user) = setup();

    store.store(&user, "sk-or-v1-secret-value").await.unwrap();

    assert_eq!(
        store.load(&user).await.unwrap().as_deref(),
        Some("sk-or-v1-secret-value")
    );
    let on_disk = std::fs::read_to_string(dir.path().join("7.json")).unwrap();
    assert!(!on_disk.contains("sk-or-v1-secret-value"));
}

#[tokio::test]
async fn given_removed_key_when_removing_again_then_reports_false() {
    let (_dir, store, user) = setup();
    store.store(&user, "sk-or-v1-secret-value").await.unwrap();

    assert!(store.remove(&user).await.unwrap());
    assert!(!store.remove(&user).await.unwrap());
    assert!(!store.has_key(&user).await.unwrap());
    assert!(store.load(&user).await.unwrap().is_none());
}

#[tokio::test]
async fn given_user_key_and_server_key_when_resolving_then_user_key_wins() {
    let (_dir, store, user) = setup();
    store.store(&user, "sk-user-key-123").await.unwrap();
    let resolver = ApiKeyResolver::new(store, Some("sk-server-key".to_string()));

    assert_eq!(resolver.resolve(&user).await.unwrap(), "sk-user-key-123");
}

#[tokio::test]
async fn given_no_user_key_when_resolving_then_server_key_used() {
    let (_dir, store, user) = setup();
    let resolver = ApiKeyResolver::new(store, Some("sk-server-key".to_string()));

    assert_eq!(resolver.resolve(&user).await.unwrap(), "sk-server-key");
}

#[tokio::test]
async fn given_no_key_anywhere_when_resolving_then_settings_hint_returned() {
    let (_dir, store, user) = setup();
    let resolver = ApiKeyResolver::new(store, Some("   ".to_string()));

    assert_eq!(resolver.resolve(&user).await.unwrap_err(), NO_API_KEY_MESSAGE);
}

#[tokio::test]
async fn given_corrupted_record_when_resolving_then_decrypt_hint_returned() {
    let (dir, store, user) = setup();
    std::fs::write(dir.path().join("7.json"), r#"{"api_key":"not-sealed-by-us"}"#).unwrap();
    let resolver = ApiKeyResolver::new(store, Some("sk-server-key".to_string()));

    assert_eq!(resolver.resolve(&user).await.unwrap_err(), DECRYPT_FAILED_MESSAGE);
    assert_eq!(
        resolver.masked(&user).await.unwrap().as_deref(),
        Some("••••••••••••")
    );
}

#[tokio::test]
async fn given_stored_key_when_masking_then_prefix_and_suffix_shown() {
    let (_dir, store, user) = setup();
    store.store(&user, "sk-or-v1-abcdef123456").await.unwrap();
    let resolver = ApiKeyResolver::new(store, None);

    assert_eq!(
        resolver.masked(&user).await.unwrap().as_deref(),
        Some("sk-or-v...3456")
    );
}

#[tokio::test]
async fn given_no_stored_key_when_masking_then_none() {
    let (_dir, store, user) = setup();
    let resolver = ApiKeyResolver::new(store, Some("sk-server-key".to_string()));

    assert!(resolver.masked(&user).await.unwrap().is_none());
}

#[tokio::test]
async fn given_unreadable_record_when_resolving_then_server_side_failure_reported() {
    let (dir, store, user) = setup();
    std::fs::write(dir.path().join("7.json"), "{ not json").unwrap();
    let resolver = ApiKeyResolver::new(store, Some("sk-server-key".to_string()));

    let message = resolver.resolve(&user).await.unwrap_err();

    assert_eq!(message, CREDENTIAL_UNAVAILABLE_MESSAGE);
    assert_ne!(message, DECRYPT_FAILED_MESSAGE);
}
