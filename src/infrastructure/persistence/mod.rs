mod json_conversation_repository;
mod json_credential_store;

pub use json_conversation_repository::JsonConversationRepository;
pub use json_credential_store::JsonCredentialStore;
