//! Cipher error types

use thiserror::Error;

/// Errors that can occur while operating on ballot ciphertexts
#[derive(Error, Debug)]
pub enum CipherError {
    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decrypted value lies outside the admissible range `0..=max`
    #[error("Decrypted value outside 0..={max}")]
    OutOfRange { max: u64 },

    /// Invalid ciphertext encoding
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Homomorphic operation failed
    #[error("Homomorphic operation failed: {0}")]
    OperationFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl From<bincode::Error> for CipherError {
    fn from(e: bincode::Error) -> Self {
        CipherError::SerializationError(e.to_string())
    }
}
