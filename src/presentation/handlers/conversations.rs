use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClient;
use crate::domain::{Conversation, ConversationId, ConversationPatch, ConversationSummary};
use crate::presentation::extractors::CurrentUser;
use crate::presentation::state::AppState;

use super::ApiError;

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    pub model: String,
}

#[derive(Serialize)]
pub struct DeleteConversationResponse {
    pub deleted: bool,
}

/// Ids that are not UUIDs cannot exist, so they resolve to not-found.
pub(super) fn parse_conversation_id(raw: &str) -> Result<ConversationId, ApiError> {
    raw.parse().map_err(|_| ApiError::conversation_not_found())
}

pub async fn list_conversations_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<Json<Vec<ConversationSummary>>, ApiError>
where
    L: LlmClient + 'static,
{
    let conversations = state.conversation_repository.list_all(&user.id).await?;
    Ok(Json(conversations))
}

pub async fn get_conversation_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Path(conversation_id): Path<String>,
) -> Result<Json<Conversation>, ApiError>
where
    L: LlmClient + 'static,
{
    let id = parse_conversation_id(&conversation_id)?;
    state
        .conversation_repository
        .get(&user.id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::conversation_not_found)
}

#[tracing::instrument(skip(state, user, request), fields(user = %user.id, model = %request.model))]
pub async fn create_conversation_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Json(request): Json<CreateConversationRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let model = request.model.trim();
    if model.is_empty() {
        return Err(ApiError::Validation("model is required".to_string()));
    }

    let conversation = state.conversation_repository.create(&user.id, model).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn update_conversation_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Path(conversation_id): Path<String>,
    Json(patch): Json<ConversationPatch>,
) -> Result<Json<Conversation>, ApiError>
where
    L: LlmClient + 'static,
{
    let id = parse_conversation_id(&conversation_id)?;
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty())
        || patch.model.as_deref().is_some_and(|m| m.trim().is_empty())
    {
        return Err(ApiError::Validation(
            "title and model must not be blank".to_string(),
        ));
    }

    state
        .conversation_repository
        .update_metadata(&user.id, id, patch)
        .await?
        .map(Json)
        .ok_or_else(ApiError::conversation_not_found)
}

pub async fn delete_conversation_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Path(conversation_id): Path<String>,
) -> Result<Json<DeleteConversationResponse>, ApiError>
where
    L: LlmClient + 'static,
{
    let deleted = match conversation_id.parse::<ConversationId>() {
        Ok(id) => state.conversation_repository.delete(&user.id, id).await?,
        Err(_) => false,
    };
    tracing::info!(user = %user.id, %conversation_id, deleted, "Delete conversation");
    Ok(Json(DeleteConversationResponse { deleted }))
}
