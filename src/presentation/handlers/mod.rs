mod api_key;
mod ask;
mod conversations;
mod error;
mod health;
mod models;
mod workspace;

pub use api_key::{delete_api_key_handler, show_api_key_handler, update_api_key_handler};
pub use ask::{ask_handler, complete_handler, save_response_handler, stream_handler};
pub use conversations::{
    create_conversation_handler, delete_conversation_handler, get_conversation_handler,
    list_conversations_handler, update_conversation_handler,
};
pub use error::{ApiError, ErrorBody, ErrorResponse};
pub use health::health_handler;
pub use models::models_handler;
pub use workspace::workspace_handler;
