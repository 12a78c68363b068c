use serde::{Deserialize, Serialize};

/// An entry of the upstream model catalog, flattened for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub context_length: u64,
    pub max_completion_tokens: u64,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
    pub supported_parameters: Vec<String>,
}
