use crate::presentation::config::{Environment, LoggingSettings};

/// Subscriber options resolved from settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: Environment,
    pub default_filter: String,
    pub json_format: bool,
}

impl TracingConfig {
    pub fn from_settings(environment: Environment, logging: &LoggingSettings) -> Self {
        Self {
            environment,
            default_filter: logging.level.clone(),
            // LOG_FORMAT=json forces structured output regardless of settings
            json_format: logging.enable_json
                || std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_settings(Environment::Local, &LoggingSettings::default())
    }
}
