use std::convert::Infallible;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, header};
use axum::response::{IntoResponse, Response};
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};

use crate::application::ports::{CompletionRequest, LlmClient};
use crate::application::services::{RelayStream, RelayUnit};
use crate::domain::{Conversation, ConversationId, ConversationPatch, Message, strip_reasoning};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::extractors::CurrentUser;
use crate::presentation::state::AppState;

use super::ApiError;
use super::conversations::parse_conversation_id;

const CONVERSATION_NOT_FOUND: &str = "Conversation not found";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub message: String,
    pub model: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub conversation_id: ConversationId,
    pub messages: Vec<Message>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub conversation_id: String,
    pub model: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponseRequest {
    pub conversation_id: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct SaveResponseResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub content: String,
}

/// Records the user's message, creating the conversation on first use.
#[tracing::instrument(skip(state, user, request), fields(user = %user.id, model = %request.model))]
pub async fn ask_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError>
where
    L: LlmClient + 'static,
{
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message is required".to_string()));
    }
    if request.model.trim().is_empty() {
        return Err(ApiError::Validation("model is required".to_string()));
    }
    tracing::debug!(prompt = %sanitize_prompt(&request.message), "Received user message");

    let repository = &state.conversation_repository;
    let conversation_id = match request.conversation_id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw) => parse_conversation_id(raw)?,
        None => repository.create(&user.id, &request.model).await?.id,
    };

    let conversation = repository
        .append_message(&user.id, conversation_id, Message::user(request.message))
        .await?
        .ok_or_else(ApiError::conversation_not_found)?;

    if conversation.model != request.model {
        repository
            .update_metadata(&user.id, conversation_id, ConversationPatch::model(&request.model))
            .await?;
    }

    Ok(Json(AskResponse {
        conversation_id,
        messages: conversation.messages,
    }))
}

/// Streams the assistant reply as plain text.
///
/// Failures before the upstream call are reported in-band with the same
/// `[ERROR]` sentinel so the client has a single code path.
#[tracing::instrument(skip(state, user, request), fields(user = %user.id, model = %request.model))]
pub async fn stream_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Json(request): Json<StreamRequest>,
) -> Result<Response, ApiError>
where
    L: LlmClient + 'static,
{
    let conversation = match load_conversation(&state, &user, &request.conversation_id).await? {
        Some(conversation) => conversation,
        None => return Ok(plain_text_stream(RelayUnit::error_stream(CONVERSATION_NOT_FOUND))),
    };

    let api_key = match state.api_keys.resolve(&user.id).await {
        Ok(api_key) => api_key,
        Err(message) => return Ok(plain_text_stream(RelayUnit::error_stream(message))),
    };

    let completion = CompletionRequest {
        api_key,
        model: request.model,
        messages: conversation.messages,
        temperature: state.settings.llm.temperature,
        prompt_context: state.prompt_context(user.name),
    };

    Ok(plain_text_stream(state.stream_relay.relay(completion)))
}

/// Persists the finished reply without its reasoning segments.
#[tracing::instrument(skip(state, user, request), fields(user = %user.id))]
pub async fn save_response_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Json(request): Json<SaveResponseRequest>,
) -> Result<Json<SaveResponseResponse>, ApiError>
where
    L: LlmClient + 'static,
{
    if request.content.trim().is_empty() {
        return Err(ApiError::Validation("content is required".to_string()));
    }

    let id = parse_conversation_id(&request.conversation_id)?;
    let content = strip_reasoning(&request.content);

    state
        .conversation_repository
        .append_message(&user.id, id, Message::assistant(content))
        .await?
        .ok_or_else(ApiError::conversation_not_found)?;

    Ok(Json(SaveResponseResponse { success: true }))
}

/// Blocking variant of the reply: asks upstream once and stores the answer.
#[tracing::instrument(skip(state, user, request), fields(user = %user.id, model = %request.model))]
pub async fn complete_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Json(request): Json<StreamRequest>,
) -> Result<Json<CompleteResponse>, ApiError>
where
    L: LlmClient + 'static,
{
    let id = parse_conversation_id(&request.conversation_id)?;
    let conversation = state
        .conversation_repository
        .get(&user.id, id)
        .await?
        .ok_or_else(ApiError::conversation_not_found)?;

    let api_key = state
        .api_keys
        .resolve(&user.id)
        .await
        .map_err(ApiError::Validation)?;

    let completion = CompletionRequest {
        api_key,
        model: request.model,
        messages: conversation.messages,
        temperature: state.settings.llm.temperature,
        prompt_context: state.prompt_context(user.name),
    };
    let content = state.llm_client.complete(&completion).await?;

    state
        .conversation_repository
        .append_message(&user.id, id, Message::assistant(strip_reasoning(&content)))
        .await?
        .ok_or_else(ApiError::conversation_not_found)?;

    Ok(Json(CompleteResponse { content }))
}

async fn load_conversation<L>(
    state: &AppState<L>,
    user: &CurrentUser,
    raw_id: &str,
) -> Result<Option<Conversation>, ApiError>
where
    L: LlmClient + 'static,
{
    let Ok(id) = raw_id.parse::<ConversationId>() else {
        return Ok(None);
    };
    Ok(state.conversation_repository.get(&user.id, id).await?)
}

fn plain_text_stream(units: RelayStream) -> Response {
    let body = Body::from_stream(units.map(|unit| Ok::<_, Infallible>(unit.into_bytes())));

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache, no-store"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        body,
    )
        .into_response()
}
