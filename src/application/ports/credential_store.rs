use async_trait::async_trait;

use crate::domain::UserId;

use super::CipherError;

/// Per-user upstream API keys, sealed at rest.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn store(&self, user: &UserId, api_key: &str) -> Result<(), CredentialError>;

    /// Returns the unsealed key, `None` if the user never configured one.
    async fn load(&self, user: &UserId) -> Result<Option<String>, CredentialError>;

    async fn remove(&self, user: &UserId) -> Result<bool, CredentialError>;

    async fn has_key(&self, user: &UserId) -> Result<bool, CredentialError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to decrypt api key: {0}")]
    Decrypt(#[from] CipherError),
    #[error("io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
