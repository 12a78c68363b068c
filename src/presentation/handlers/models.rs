use axum::Json;
use axum::extract::State;

use crate::application::ports::LlmClient;
use crate::domain::ModelDescriptor;
use crate::presentation::state::AppState;

use super::ApiError;

pub async fn models_handler<L>(
    State(state): State<AppState<L>>,
) -> Result<Json<Vec<ModelDescriptor>>, ApiError>
where
    L: LlmClient + 'static,
{
    Ok(Json(state.model_catalog.models().await?))
}
