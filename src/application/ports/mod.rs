mod cache;
mod conversation_repository;
mod credential_store;
mod llm_client;
mod repository_error;
mod secret_cipher;

pub use cache::Cache;
pub use conversation_repository::ConversationRepository;
pub use credential_store::{CredentialError, CredentialStore};
pub use llm_client::{CompletionRequest, LlmByteStream, LlmClient, LlmClientError};
pub use repository_error::RepositoryError;
pub use secret_cipher::{CipherError, SecretCipher};
