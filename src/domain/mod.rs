mod conversation;
mod conversation_id;
mod message;
mod message_role;
mod model_descriptor;
mod reasoning;
mod stream_event;
mod user_id;

pub use conversation::{
    Conversation, ConversationPatch, ConversationSummary, PLACEHOLDER_TITLE, TITLE_MAX_CHARS,
};
pub use conversation_id::ConversationId;
pub use message::{ContentPart, ImageUrl, Message, MessageContent};
pub use message_role::MessageRole;
pub use model_descriptor::ModelDescriptor;
pub use reasoning::{ERROR_PREFIX, REASONING_CLOSE, REASONING_OPEN, strip_reasoning};
pub use stream_event::StreamEvent;
pub use user_id::{InvalidUserId, UserId};
