/// Opaque seal/unseal capability for secrets persisted on disk.
pub trait SecretCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    fn decrypt(&self, sealed: &str) -> Result<String, CipherError>;

    /// False when sealed values can be read back without a key.
    fn seals_at_rest(&self) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("payload is not a sealed secret")]
    InvalidPayload,
    #[error("sealed secret is not valid utf-8")]
    InvalidUtf8,
}
