//! Error types for fhevm-client

use std::fmt;

use fhevm_core::ValidationError;
use thiserror::Error;

/// Failure reported by a collaborator (engine, gateway, signer)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Step of session initialization that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Bootstrap,
    PublicKey,
    Context,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStage::Bootstrap => write!(f, "bootstrap"),
            InitStage::PublicKey => write!(f, "public_key"),
            InitStage::Context => write!(f, "context"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptMode {
    User,
    Public,
}

impl fmt::Display for DecryptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecryptMode::User => write!(f, "user"),
            DecryptMode::Public => write!(f, "public"),
        }
    }
}

/// Coarse category of a [`ClientError`], for matching without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Range,
    Format,
    Type,
    NotInitialized,
    EmptyInput,
    AlreadyEncrypted,
    Encryption,
    Initialization,
    Decryption,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("FHEVM client not initialized. Call init() first.")]
    NotInitialized,

    #[error("No values to encrypt")]
    EmptyInput,

    #[error("Encrypted input already produced; create a new builder")]
    AlreadyEncrypted,

    #[error("Encryption failed: {source}")]
    Encryption {
        #[source]
        source: BoxError,
    },

    #[error("Failed to initialize FHEVM client at {stage}: {source}")]
    Initialization {
        stage: InitStage,
        #[source]
        source: BoxError,
    },

    #[error("{mode} decryption failed: {source}")]
    Decryption {
        mode: DecryptMode,
        #[source]
        source: BoxError,
    },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(ValidationError::Range { .. }) => ErrorKind::Range,
            ClientError::Validation(ValidationError::Format(_)) => ErrorKind::Format,
            ClientError::Validation(ValidationError::Type(_)) => ErrorKind::Type,
            ClientError::NotInitialized => ErrorKind::NotInitialized,
            ClientError::EmptyInput => ErrorKind::EmptyInput,
            ClientError::AlreadyEncrypted => ErrorKind::AlreadyEncrypted,
            ClientError::Encryption { .. } => ErrorKind::Encryption,
            ClientError::Initialization { .. } => ErrorKind::Initialization,
            ClientError::Decryption { .. } => ErrorKind::Decryption,
        }
    }

    /// Whether repeating the same call could succeed
    ///
    /// Only collaborator failures qualify; caller mistakes never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Encryption { .. } | ClientError::Decryption { .. }
        )
    }

    pub(crate) fn encryption(source: impl Into<BoxError>) -> Self {
        ClientError::Encryption {
            source: source.into(),
        }
    }

    pub(crate) fn decryption(mode: DecryptMode, source: impl Into<BoxError>) -> Self {
        ClientError::Decryption {
            mode,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
