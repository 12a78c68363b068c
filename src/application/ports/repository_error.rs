#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
