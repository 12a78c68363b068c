use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use crate::application::ports::{ConversationRepository, LlmClient};
use crate::application::services::{ApiKeyResolver, ModelCatalog, PromptContext, StreamRelay};
use crate::presentation::config::Settings;

pub struct AppState<L>
where
    L: LlmClient,
{
    pub conversation_repository: Arc<dyn ConversationRepository>,
    pub api_keys: Arc<ApiKeyResolver>,
    pub llm_client: Arc<L>,
    pub stream_relay: Arc<StreamRelay<L>>,
    pub model_catalog: Arc<ModelCatalog<L>>,
    pub settings: Settings,
}

impl<L> AppState<L>
where
    L: LlmClient,
{
    /// Prompt context for `user_name` at the configured local time.
    pub fn prompt_context(&self, user_name: Option<String>) -> PromptContext {
        let offset = FixedOffset::east_opt(self.settings.prompt.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        PromptContext::new(user_name, Utc::now().with_timezone(&offset))
    }
}

impl<L> Clone for AppState<L>
where
    L: LlmClient,
{
    fn clone(&self) -> Self {
        Self {
            conversation_repository: Arc::clone(&self.conversation_repository),
            api_keys: Arc::clone(&self.api_keys),
            llm_client: Arc::clone(&self.llm_client),
            stream_relay: Arc::clone(&self.stream_relay),
            model_catalog: Arc::clone(&self.model_catalog),
            settings: self.settings.clone(),
        }
    }
}
