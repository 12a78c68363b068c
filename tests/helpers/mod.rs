#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{FixedOffset, TimeZone};
use futures::stream::{self, StreamExt};

use colloquy::application::ports::{
    CompletionRequest, LlmByteStream, LlmClient, LlmClientError,
};
use colloquy::application::services::{
    ApiKeyResolver, ModelCatalog, PromptContext, StreamRelay,
};
use colloquy::domain::{Message, ModelDescriptor};
use colloquy::infrastructure::cache::TtlCache;
use colloquy::infrastructure::crypto::Base64Cipher;
use colloquy::infrastructure::persistence::{JsonConversationRepository, JsonCredentialStore};
use colloquy::presentation::{AppState, Settings, create_router};

/// Upstream double replaying canned SSE chunks and recording every request.
#[derive(Default)]
pub struct ScriptedLlmClient {
    pub chunks: Vec<Result<&'static str, &'static str>>,
    pub request_error: Option<&'static str>,
    pub completion: String,
    pub models: Vec<ModelDescriptor>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    pub model_calls: Mutex<usize>,
    /// Upstream chunks handed out so far across all streams.
    pub chunks_polled: Arc<AtomicUsize>,
    /// Runs inside `complete`, before the reply is returned.
    pub before_complete: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl ScriptedLlmClient {
    pub fn streaming(chunks: &[&'static str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| Ok(*c)).collect(),
            ..Self::default()
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            request_error: Some(message),
            ..Self::default()
        }
    }

    pub fn chunks_polled(&self) -> usize {
        self.chunks_polled.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(hook) = self.before_complete.lock().unwrap().take() {
            hook();
        }
        match self.request_error {
            Some(message) => Err(LlmClientError::Api(message.to_string())),
            None => Ok(self.completion.clone()),
        }
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<LlmByteStream, LlmClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = self.request_error {
            return Err(LlmClientError::Api(message.to_string()));
        }

        let items: Vec<Result<Bytes, LlmClientError>> = self
            .chunks
            .iter()
            .map(|chunk| match chunk {
                Ok(text) => Ok(Bytes::from_static(text.as_bytes())),
                Err(message) => Err(LlmClientError::ApiRequestFailed(message.to_string())),
            })
            .collect();
        let polled = Arc::clone(&self.chunks_polled);
        Ok(Box::pin(stream::iter(items).inspect(move |_| {
            polled.fetch_add(1, Ordering::SeqCst);
        })))
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LlmClientError> {
        *self.model_calls.lock().unwrap() += 1;
        Ok(self.models.clone())
    }
}

pub fn model(id: &str, name: &str) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        context_length: 128_000,
        max_completion_tokens: 4096,
        input_modalities: vec!["text".to_string()],
        output_modalities: vec!["text".to_string()],
        supported_parameters: vec!["temperature".to_string()],
    }
}

pub fn prompt_context() -> PromptContext {
    let offset = FixedOffset::east_opt(3600).unwrap();
    PromptContext::new(
        Some("Alice".to_string()),
        offset.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap(),
    )
}

pub fn completion_request(messages: Vec<Message>) -> CompletionRequest {
    CompletionRequest {
        api_key: "sk-test-key".to_string(),
        model: "openai/gpt-4o-mini".to_string(),
        messages,
        temperature: 1.0,
        prompt_context: prompt_context(),
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub llm_client: Arc<ScriptedLlmClient>,
    pub credential_store: Arc<JsonCredentialStore>,
    dir: tempfile::TempDir,
}

impl TestApp {
    pub fn conversations_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("conversations")
    }
}

pub fn create_test_app(llm_client: ScriptedLlmClient, server_key: Option<&str>) -> TestApp {
    let dir = tempfile::TempDir::new().unwrap();
    let llm_client = Arc::new(llm_client);
    let credential_store = Arc::new(JsonCredentialStore::new(
        dir.path().join("credentials"),
        Arc::new(Base64Cipher),
    ));

    let state = AppState {
        conversation_repository: Arc::new(JsonConversationRepository::new(
            dir.path().join("conversations"),
        )),
        api_keys: Arc::new(ApiKeyResolver::new(
            credential_store.clone(),
            server_key.map(str::to_string),
        )),
        llm_client: Arc::clone(&llm_client),
        stream_relay: Arc::new(StreamRelay::new(Arc::clone(&llm_client))),
        model_catalog: Arc::new(ModelCatalog::new(
            Arc::clone(&llm_client),
            Arc::new(TtlCache::<Vec<ModelDescriptor>>::new()),
            Duration::from_secs(3600),
        )),
        settings: Settings::default(),
    };

    TestApp {
        router: create_router(state),
        llm_client,
        credential_store,
        dir,
    }
}
