use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use colloquy::application::ports::SecretCipher;
use colloquy::application::services::{ApiKeyResolver, ModelCatalog, StreamRelay, SystemPrompt};
use colloquy::domain::ModelDescriptor;
use colloquy::infrastructure::cache::TtlCache;
use colloquy::infrastructure::crypto::Base64Cipher;
use colloquy::infrastructure::llm::OpenRouterClient;
use colloquy::infrastructure::observability::{TracingConfig, init_tracing};
use colloquy::infrastructure::persistence::{JsonConversationRepository, JsonCredentialStore};
use colloquy::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging));

    let system_prompt = SystemPrompt::new(&settings.prompt.template, &settings.prompt.locale);
    let llm_client = Arc::new(
        OpenRouterClient::new(&settings.llm, system_prompt)
            .context("Failed to build completion client")?,
    );

    let conversation_repository = Arc::new(JsonConversationRepository::new(
        &settings.storage.conversations_dir,
    ));
    let cipher: Arc<dyn SecretCipher> = Arc::new(Base64Cipher);
    if !cipher.seals_at_rest() {
        tracing::warn!(
            credentials_dir = %settings.storage.credentials_dir.display(),
            "Api keys are only base64-encoded on disk; restrict access to the credentials directory"
        );
    }
    let credential_store = Arc::new(JsonCredentialStore::new(
        &settings.storage.credentials_dir,
        cipher,
    ));
    let api_keys = Arc::new(ApiKeyResolver::new(
        credential_store,
        Some(settings.llm.api_key.clone()),
    ));

    let model_catalog = Arc::new(ModelCatalog::new(
        Arc::clone(&llm_client),
        Arc::new(TtlCache::<Vec<ModelDescriptor>>::new()),
        Duration::from_secs(settings.llm.models_cache_ttl_seconds),
    ));
    let stream_relay = Arc::new(StreamRelay::new(Arc::clone(&llm_client)));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        conversation_repository,
        api_keys,
        llm_client,
        stream_relay,
        model_catalog,
        settings,
    };

    let router = create_router(state);

    tracing::info!(%addr, %environment, "Listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
