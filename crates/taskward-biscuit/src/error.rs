use thiserror::Error;

/// Errors raised while handling signing keys and principal tokens.
#[derive(Debug, Error)]
pub enum BiscuitError {
    #[error("failed to generate keypair: {0}")]
    KeyGenerationFailed(String),

    /// Failed to parse private key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// Failed to create token.
    #[error("failed to create token: {0}")]
    TokenCreationFailed(String),

    /// Failed to parse token.
    #[error("failed to parse token: {0}")]
    TokenParseFailed(String),

    /// Token verification failed (bad signature, failed check, expired).
    #[error("token verification failed: {0}")]
    VerificationFailed(String),

    /// A principal fact is absent from the authority block.
    #[error("token missing required claim: {claim}")]
    MissingClaim { claim: String },

    /// A claim is present but unusable.
    #[error("token claim '{claim}' is invalid: {reason}")]
    InvalidClaim { claim: String, reason: String },

    /// Failed to serialize token.
    #[error("token serialization error: {0}")]
    SerializationError(String),

    /// IO error (reading/writing keys).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
