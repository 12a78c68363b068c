use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::application::ports::{CipherError, SecretCipher};

const PREFIX: &str = "b64:";

/// Reversible encoding standing in for a real cipher.
///
/// Keeps secrets out of casual view only; swap in an authenticated cipher
/// behind `SecretCipher` for real deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Cipher;

impl SecretCipher for Base64Cipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(format!("{PREFIX}{}", STANDARD.encode(plaintext)))
    }

    fn decrypt(&self, sealed: &str) -> Result<String, CipherError> {
        let encoded = sealed.strip_prefix(PREFIX).ok_or(CipherError::InvalidPayload)?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| CipherError::InvalidPayload)?;
        String::from_utf8(bytes).map_err(|_| CipherError::InvalidUtf8)
    }

    fn seals_at_rest(&self) -> bool {
        false
    }
}
