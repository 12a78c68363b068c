use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClient;
use crate::domain::{ConversationId, ConversationSummary, Message, ModelDescriptor, UserId};
use crate::presentation::extractors::CurrentUser;
use crate::presentation::state::AppState;

use super::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceQuery {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
pub struct WorkspaceUser {
    pub id: String,
    pub name: Option<String>,
}

/// Everything the chat page needs in one payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub models: Vec<ModelDescriptor>,
    pub selected_model: String,
    pub messages: Vec<Message>,
    pub conversations: Vec<ConversationSummary>,
    pub current_conversation_id: Option<String>,
    pub user: WorkspaceUser,
    pub has_api_key: bool,
}

pub async fn workspace_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<WorkspaceResponse>, ApiError>
where
    L: LlmClient + 'static,
{
    let repository = &state.conversation_repository;
    let conversations = repository.list_all(&user.id).await?;

    let current = match query.conversation_id.as_deref().map(str::parse::<ConversationId>) {
        Some(Ok(id)) => repository.get(&user.id, id).await?,
        _ => None,
    };

    // the page stays usable when the catalog is unreachable
    let models = state.model_catalog.models().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Model catalog unavailable");
        Vec::new()
    });

    let (selected_model, messages) = match current {
        Some(conversation) => (conversation.model, conversation.messages),
        None => (state.settings.llm.default_model.clone(), Vec::new()),
    };

    Ok(Json(WorkspaceResponse {
        models,
        selected_model,
        messages,
        conversations,
        current_conversation_id: query.conversation_id,
        has_api_key: has_api_key(&state, &user.id).await?,
        user: WorkspaceUser {
            id: user.id.to_string(),
            name: user.name,
        },
    }))
}

async fn has_api_key<L>(state: &AppState<L>, user: &UserId) -> Result<bool, ApiError>
where
    L: LlmClient + 'static,
{
    Ok(state.api_keys.store().has_key(user).await?)
}
