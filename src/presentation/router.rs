use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::LlmClient;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    ask_handler, complete_handler, create_conversation_handler, delete_api_key_handler,
    delete_conversation_handler, get_conversation_handler, health_handler,
    list_conversations_handler, models_handler, save_response_handler, show_api_key_handler,
    stream_handler, update_api_key_handler, update_conversation_handler, workspace_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmClient + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/models", get(models_handler::<L>))
        .route("/api/workspace", get(workspace_handler::<L>))
        .route(
            "/api/settings/api-key",
            get(show_api_key_handler::<L>)
                .put(update_api_key_handler::<L>)
                .delete(delete_api_key_handler::<L>),
        )
        .route(
            "/api/conversations",
            get(list_conversations_handler::<L>).post(create_conversation_handler::<L>),
        )
        .route(
            "/api/conversations/{conversation_id}",
            get(get_conversation_handler::<L>)
                .patch(update_conversation_handler::<L>)
                .delete(delete_conversation_handler::<L>),
        )
        .route("/api/ask", post(ask_handler::<L>))
        .route("/api/ask/stream", post(stream_handler::<L>))
        .route("/api/ask/response", post(save_response_handler::<L>))
        .route("/api/ask/complete", post(complete_handler::<L>))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
