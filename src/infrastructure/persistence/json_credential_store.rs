use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::application::ports::{CredentialError, CredentialStore, SecretCipher};
use crate::domain::UserId;

#[derive(Serialize, Deserialize)]
struct CredentialRecord {
    api_key: String,
}

/// One `{user}.json` file per user holding the sealed api key.
pub struct JsonCredentialStore {
    root: PathBuf,
    cipher: Arc<dyn SecretCipher>,
}

impl JsonCredentialStore {
    pub fn new(root: impl Into<PathBuf>, cipher: Arc<dyn SecretCipher>) -> Self {
        Self {
            root: root.into(),
            cipher,
        }
    }

    fn path(&self, user: &UserId) -> PathBuf {
        self.root.join(format!("{}.json", user.as_str()))
    }

    async fn read_record(&self, user: &UserId) -> Result<Option<CredentialRecord>, CredentialError> {
        match tokio::fs::read(self.path(user)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    #[instrument(skip(self, api_key), fields(user = %user))]
    async fn store(&self, user: &UserId, api_key: &str) -> Result<(), CredentialError> {
        let record = CredentialRecord {
            api_key: self.cipher.encrypt(api_key)?,
        };
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path(user), serde_json::to_vec_pretty(&record)?).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn load(&self, user: &UserId) -> Result<Option<String>, CredentialError> {
        match self.read_record(user).await? {
            Some(record) if !record.api_key.is_empty() => {
                Ok(Some(self.cipher.decrypt(&record.api_key)?))
            }
            _ => Ok(None),
        }
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn remove(&self, user: &UserId) -> Result<bool, CredentialError> {
        match tokio::fs::remove_file(self.path(user)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn has_key(&self, user: &UserId) -> Result<bool, CredentialError> {
        Ok(self
            .read_record(user)
            .await?
            .is_some_and(|record| !record.api_key.is_empty()))
    }
}
