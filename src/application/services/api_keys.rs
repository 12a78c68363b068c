use std::sync::Arc;

use crate::application::ports::{CredentialError, CredentialStore};
use crate::domain::UserId;

pub const MIN_API_KEY_LEN: usize = 10;
pub const NO_API_KEY_MESSAGE: &str =
    "No API key configured. Please add your API key in Settings.";
pub const DECRYPT_FAILED_MESSAGE: &str =
    "Failed to decrypt API key. Please re-enter your API key in Settings.";
pub const CREDENTIAL_UNAVAILABLE_MESSAGE: &str =
    "Your API key could not be read right now. Please try again later.";
const UNREADABLE_MASK: &str = "••••••••••••";

/// Chooses which upstream key a user's requests are signed with.
pub struct ApiKeyResolver {
    credential_store: Arc<dyn CredentialStore>,
    fallback_key: Option<String>,
}

impl ApiKeyResolver {
    pub fn new(credential_store: Arc<dyn CredentialStore>, fallback_key: Option<String>) -> Self {
        Self {
            credential_store,
            fallback_key: fallback_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.credential_store
    }

    /// The user's own key, else the server key.
    ///
    /// The error string is the user-facing message for the reply stream.
    pub async fn resolve(&self, user: &UserId) -> Result<String, String> {
        match self.credential_store.load(user).await {
            Ok(Some(key)) => Ok(key),
            Ok(None) => self
                .fallback_key
                .clone()
                .ok_or_else(|| NO_API_KEY_MESSAGE.to_string()),
            Err(CredentialError::Decrypt(e)) => {
                tracing::warn!(user = %user, error = %e, "Stored api key could not be unsealed");
                Err(DECRYPT_FAILED_MESSAGE.to_string())
            }
            Err(e) => {
                tracing::error!(user = %user, error = %e, "Credential store failure");
                Err(CREDENTIAL_UNAVAILABLE_MESSAGE.to_string())
            }
        }
    }

    /// Masked form of the user's own key for display.
    pub async fn masked(&self, user: &UserId) -> Result<Option<String>, CredentialError> {
        if !self.credential_store.has_key(user).await? {
            return Ok(None);
        }
        match self.credential_store.load(user).await {
            Ok(key) => Ok(key.map(|key| mask_api_key(&key))),
            Err(CredentialError::Decrypt(_)) => Ok(Some(UNREADABLE_MASK.to_string())),
            Err(e) => Err(e),
        }
    }
}

/// First 7 and last 4 characters around an ellipsis.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(7).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}
