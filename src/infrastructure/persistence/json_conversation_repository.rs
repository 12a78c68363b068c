use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::Mutex as AsyncMutex;
use tracing::instrument;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{
    Conversation, ConversationId, ConversationPatch, ConversationSummary, Message, UserId,
};

const INDEX_FILE: &str = "index.json";

/// Conversation store laid out as one directory per user:
///
/// ```text
/// {root}/{user}/index.json   id -> summary, no messages
/// {root}/{user}/{id}.json    full conversation
/// ```
///
/// Mutations for the same user are serialized through a per-user lock so two
/// near-simultaneous appends cannot lose each other's read-modify-write.
pub struct JsonConversationRepository {
    root: PathBuf,
    user_locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl JsonConversationRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    fn user_dir(&self, user: &UserId) -> PathBuf {
        self.root.join(user.as_str())
    }

    fn index_path(&self, user: &UserId) -> PathBuf {
        self.user_dir(user).join(INDEX_FILE)
    }

    fn conversation_path(&self, user: &UserId, id: ConversationId) -> PathBuf {
        self.user_dir(user).join(format!("{id}.json"))
    }

    fn user_lock(&self, user: &UserId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(user.clone()).or_default())
    }

    async fn load_index(&self, user: &UserId) -> Result<Map<String, Value>, RepositoryError> {
        Ok(read_json::<Map<String, Value>>(&self.index_path(user))
            .await?
            .unwrap_or_default())
    }

    async fn save_index(
        &self,
        user: &UserId,
        index: &Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        write_json(&self.index_path(user), index).await
    }

    async fn upsert_index(
        &self,
        user: &UserId,
        summary: &ConversationSummary,
    ) -> Result<(), RepositoryError> {
        let mut index = self.load_index(user).await?;
        index.insert(summary.id.to_string(), serde_json::to_value(summary)?);
        self.save_index(user, &index).await
    }

    async fn save(&self, user: &UserId, conversation: &Conversation) -> Result<(), RepositoryError> {
        tokio::fs::create_dir_all(self.user_dir(user)).await?;
        write_json(&self.conversation_path(user, conversation.id), conversation).await?;
        self.upsert_index(user, &conversation.summary()).await
    }

    async fn load(
        &self,
        user: &UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        read_json(&self.conversation_path(user, id)).await
    }

    async fn modify<F>(
        &self,
        user: &UserId,
        id: ConversationId,
        change: F,
    ) -> Result<Option<Conversation>, RepositoryError>
    where
        F: FnOnce(&mut Conversation) + Send,
    {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let Some(mut conversation) = self.load(user, id).await? else {
            return Ok(None);
        };
        change(&mut conversation);
        self.save(user, &conversation).await?;
        Ok(Some(conversation))
    }
}

#[async_trait]
impl ConversationRepository for JsonConversationRepository {
    #[instrument(skip(self), fields(user = %user))]
    async fn list_all(&self, user: &UserId) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let index = self.load_index(user).await?;
        let summaries = index
            .into_iter()
            .filter_map(|(id, entry)| match serde_json::from_value(entry) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::warn!(conversation_id = %id, error = %e, "Skipping unreadable index entry");
                    None
                }
            })
            .collect();
        Ok(summaries)
    }

    #[instrument(skip(self), fields(user = %user, conversation_id = %id))]
    async fn get(
        &self,
        user: &UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        self.load(user, id).await
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn create(&self, user: &UserId, model: &str) -> Result<Conversation, RepositoryError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let conversation = Conversation::new(model);
        self.save(user, &conversation).await?;
        tracing::debug!(conversation_id = %conversation.id, "Created conversation");
        Ok(conversation)
    }

    #[instrument(skip(self, patch), fields(user = %user, conversation_id = %id))]
    async fn update_metadata(
        &self,
        user: &UserId,
        id: ConversationId,
        patch: ConversationPatch,
    ) -> Result<Option<Conversation>, RepositoryError> {
        self.modify(user, id, move |conversation| conversation.apply(patch))
            .await
    }

    #[instrument(skip(self, message), fields(user = %user, conversation_id = %id, role = %message.role))]
    async fn append_message(
        &self,
        user: &UserId,
        id: ConversationId,
        message: Message,
    ) -> Result<Option<Conversation>, RepositoryError> {
        self.modify(user, id, move |conversation| {
            conversation.push_message(message)
        })
        .await
    }

    #[instrument(skip(self), fields(user = %user, conversation_id = %id))]
    async fn delete(&self, user: &UserId, id: ConversationId) -> Result<bool, RepositoryError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let existed = match tokio::fs::remove_file(self.conversation_path(user, id)).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        // an earlier delete may have unlinked the record but failed on the index
        let mut index = self.load_index(user).await?;
        if index.remove(&id.to_string()).is_some() {
            self.save_index(user, &index).await?;
        }
        Ok(existed)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, RepositoryError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes through a sibling temp file so readers never see a torn document.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
