//! Error types for fhevm-core

use thiserror::Error;

use crate::EncryptedType;

/// A plaintext value rejected before it reaches an FHE engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Value {value} out of range for {kind} (max {max})")]
    Range {
        kind: EncryptedType,
        value: String,
        max: String,
    },

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Invalid type: {0}")]
    Type(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}
