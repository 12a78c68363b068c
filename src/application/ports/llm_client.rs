use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;

use crate::application::services::PromptContext;
use crate::domain::{Message, ModelDescriptor};

pub type LlmByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmClientError>> + Send>>;

/// A chat completion call on behalf of one user.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub api_key: String,
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub prompt_context: PromptContext,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Blocking completion returning the full assistant text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmClientError>;

    /// Opens a streaming completion; the caller decodes the SSE body.
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<LlmByteStream, LlmClientError>;

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("API error: {0}")]
    Api(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmClientError {
    /// Message suitable for the `[ERROR]` sentinel shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            LlmClientError::Api(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
