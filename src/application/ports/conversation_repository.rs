use async_trait::async_trait;

use crate::domain::{
    Conversation, ConversationId, ConversationPatch, ConversationSummary, Message, UserId,
};

use super::RepositoryError;

/// Per-user conversation storage.
///
/// A missing conversation is reported as `None`/`false`, never as an error.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn list_all(&self, user: &UserId) -> Result<Vec<ConversationSummary>, RepositoryError>;

    async fn get(
        &self,
        user: &UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    async fn create(&self, user: &UserId, model: &str) -> Result<Conversation, RepositoryError>;

    async fn update_metadata(
        &self,
        user: &UserId,
        id: ConversationId,
        patch: ConversationPatch,
    ) -> Result<Option<Conversation>, RepositoryError>;

    async fn append_message(
        &self,
        user: &UserId,
        id: ConversationId,
        message: Message,
    ) -> Result<Option<Conversation>, RepositoryError>;

    async fn delete(&self, user: &UserId, id: ConversationId) -> Result<bool, RepositoryError>;
}
