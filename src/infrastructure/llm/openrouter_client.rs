use std::time::Duration;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::{CompletionRequest, LlmByteStream, LlmClient, LlmClientError};
use crate::application::services::SystemPrompt;
use crate::domain::{Message, ModelDescriptor};
use crate::presentation::config::LlmSettings;

const STREAM_ERROR_FALLBACK: &str = "HTTP Error";
const COMPLETE_ERROR_FALLBACK: &str = "Unknown error";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat-completion client for an OpenRouter-compatible aggregator.
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    app_url: String,
    app_name: String,
    request_timeout: Duration,
    system_prompt: SystemPrompt,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<UpstreamModel>,
}

#[derive(Deserialize)]
struct UpstreamModel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    context_length: Option<u64>,
    #[serde(default)]
    top_provider: Option<TopProvider>,
    #[serde(default)]
    architecture: Option<Architecture>,
    #[serde(default)]
    supported_parameters: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TopProvider {
    #[serde(default)]
    max_completion_tokens: Option<u64>,
}

#[derive(Deserialize)]
struct Architecture {
    #[serde(default)]
    input_modalities: Option<Vec<String>>,
    #[serde(default)]
    output_modalities: Option<Vec<String>>,
}

impl From<UpstreamModel> for ModelDescriptor {
    fn from(model: UpstreamModel) -> Self {
        let architecture = model.architecture;
        let (input_modalities, output_modalities) = match architecture {
            Some(a) => (
                a.input_modalities.unwrap_or_default(),
                a.output_modalities.unwrap_or_default(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            name: model.name.unwrap_or_else(|| model.id.clone()),
            id: model.id,
            description: model.description.unwrap_or_default(),
            context_length: model.context_length.unwrap_or(0),
            max_completion_tokens: model
                .top_provider
                .and_then(|p| p.max_completion_tokens)
                .unwrap_or(0),
            input_modalities,
            output_modalities,
            supported_parameters: model.supported_parameters.unwrap_or_default(),
        }
    }
}

impl OpenRouterClient {
    pub fn new(settings: &LlmSettings, system_prompt: SystemPrompt) -> Result<Self, LlmClientError> {
        let request_timeout = Duration::from_secs(settings.request_timeout_seconds);
        // streamed replies may outlive any total deadline; bound each read instead
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(request_timeout)
            .build()
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            app_url: settings.app_url.clone(),
            app_name: settings.app_name.clone(),
            request_timeout,
            system_prompt,
        })
    }

    fn apply_headers(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.app_url)
            .header("X-Title", &self.app_name)
    }

    async fn send_completion(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<Response, LlmClientError> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: self
                .system_prompt
                .prepend(&request.prompt_context, &request.messages),
            temperature: request.temperature,
            stream: stream.then_some(true),
        };

        let mut http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if !stream {
            http_request = http_request.timeout(self.request_timeout);
        }

        self.apply_headers(http_request, &request.api_key)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))
    }
}

/// Pulls `error.message` out of a failed upstream response body.
async fn upstream_error(response: Response, fallback: &str) -> LlmClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| fallback.to_string());

    tracing::warn!(status = %status, error = %message, "Upstream returned an error status");
    LlmClientError::Api(message)
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    #[tracing::instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmClientError> {
        let response = self.send_completion(request, false).await?;

        if !response.status().is_success() {
            return Err(upstream_error(response, COMPLETE_ERROR_FALLBACK).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        Ok(body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    #[tracing::instrument(skip(self, request), fields(model = %request.model))]
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<LlmByteStream, LlmClientError> {
        let response = self.send_completion(request, true).await?;

        if !response.status().is_success() {
            return Err(upstream_error(response, STREAM_ERROR_FALLBACK).await);
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()));
        Ok(Box::pin(stream))
    }

    #[tracing::instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LlmClientError> {
        let request = self
            .client
            .get(format!("{}/models", self.base_url))
            .timeout(self.request_timeout);
        let response = self
            .apply_headers(request, &self.api_key)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(upstream_error(response, COMPLETE_ERROR_FALLBACK).await);
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        Ok(models.data.into_iter().map(ModelDescriptor::from).collect())
    }
}
