mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    LlmSettings, LoggingSettings, PromptSettings, ServerSettings, Settings, StorageSettings,
};
