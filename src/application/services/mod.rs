mod api_keys;
mod model_catalog;
mod sse_decoder;
mod stream_relay;
mod system_prompt;

pub use api_keys::{
    ApiKeyResolver, CREDENTIAL_UNAVAILABLE_MESSAGE, DECRYPT_FAILED_MESSAGE, MIN_API_KEY_LEN,
    NO_API_KEY_MESSAGE, mask_api_key,
};
pub use model_catalog::{DEFAULT_MODELS_TTL, MODELS_CACHE_KEY, ModelCatalog};
pub use sse_decoder::{SseDecoder, decode_event_stream, decode_line};
pub use stream_relay::{RelayStream, RelayUnit, StreamRelay};
pub use system_prompt::{DEFAULT_TEMPLATE, DEFAULT_USER_NAME, PromptContext, SystemPrompt};
