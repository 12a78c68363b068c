use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClient;
use crate::application::services::MIN_API_KEY_LEN;
use crate::presentation::extractors::CurrentUser;
use crate::presentation::state::AppState;

use super::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    pub has_api_key: bool,
    pub masked_key: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateApiKeyRequest {
    pub api_key: String,
}

#[derive(Serialize)]
pub struct ApiKeyChanged {
    pub status: &'static str,
}

pub async fn show_api_key_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<Json<ApiKeyStatus>, ApiError>
where
    L: LlmClient + 'static,
{
    let masked_key = state.api_keys.masked(&user.id).await?;
    Ok(Json(ApiKeyStatus {
        has_api_key: masked_key.is_some(),
        masked_key,
    }))
}

#[tracing::instrument(skip(state, user, request), fields(user = %user.id))]
pub async fn update_api_key_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    Json(request): Json<UpdateApiKeyRequest>,
) -> Result<Json<ApiKeyChanged>, ApiError>
where
    L: LlmClient + 'static,
{
    let api_key = request.api_key.trim();
    if api_key.chars().count() < MIN_API_KEY_LEN {
        return Err(ApiError::Validation(format!(
            "api_key must be at least {MIN_API_KEY_LEN} characters"
        )));
    }

    state.api_keys.store().store(&user.id, api_key).await?;
    tracing::info!("Api key updated");
    Ok(Json(ApiKeyChanged {
        status: "api-key-updated",
    }))
}

pub async fn delete_api_key_handler<L>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<Json<ApiKeyChanged>, ApiError>
where
    L: LlmClient + 'static,
{
    state.api_keys.store().remove(&user.id).await?;
    tracing::info!(user = %user.id, "Api key removed");
    Ok(Json(ApiKeyChanged {
        status: "api-key-removed",
    }))
}
