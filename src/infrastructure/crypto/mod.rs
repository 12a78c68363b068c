mod base64_cipher;

pub use base64_cipher::Base64Cipher;
