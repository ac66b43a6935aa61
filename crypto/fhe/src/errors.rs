//! Substrate error types

use thiserror::Error;

/// Errors that can occur inside the ciphertext substrate
#[derive(Error, Debug)]
pub enum FheError {
    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// No ciphertext stored under the given handle
    #[error("Unknown ciphertext handle: {0}")]
    UnknownHandle(String),

    /// Operand width does not match the stored ciphertext
    #[error("Ciphertext type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// Principal holds no decrypt grant for the handle
    #[error("Principal {principal} has no decrypt permission for handle {handle}")]
    PermissionDenied { principal: String, handle: String },

    /// Submission proof does not bind the ciphertexts to this subject/instance
    #[error("Invalid submission proof: {0}")]
    InvalidProof(String),
}
