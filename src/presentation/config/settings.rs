use std::path::PathBuf;

use config::{Config, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use super::Environment;
use crate::application::services::{DEFAULT_MODELS_TTL, DEFAULT_TEMPLATE};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub storage: StorageSettings,
    pub prompt: PromptSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// `appsettings.{environment}` overlaid with `APP_*` variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!(
                    "appsettings.{}",
                    environment.as_str().to_lowercase()
                ))
                .required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    /// Server-wide key, used for the model catalog and for users without their own.
    pub api_key: String,
    pub default_model: String,
    pub temperature: f32,
    pub request_timeout_seconds: u64,
    pub app_url: String,
    pub app_name: String,
    pub models_cache_ttl_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            default_model: "openai/gpt-4o-mini".to_string(),
            temperature: 1.0,
            request_timeout_seconds: 120,
            app_url: "http://localhost:3000".to_string(),
            app_name: "Colloquy".to_string(),
            models_cache_ttl_seconds: DEFAULT_MODELS_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub conversations_dir: PathBuf,
    pub credentials_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            conversations_dir: PathBuf::from("storage/conversations"),
            credentials_dir: PathBuf::from("storage/credentials"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    pub template: String,
    pub locale: String,
    pub utc_offset_minutes: i32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            locale: "fr_FR".to_string(),
            utc_offset_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,colloquy=debug,tower_http=debug".to_string(),
            enable_json: false,
        }
    }
}
