use thiserror::Error;

/// Failures while recording or reading audit events.
///
/// Callers on the request path log these and carry on; an audit write
/// never fails a task operation.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The configured storage could not be opened.
    #[error("audit storage unavailable: {0}")]
    InitializationFailed(String),

    #[error("audit event encoding failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("audit file I/O failed: {0}")]
    IoError(#[from] std::io::Error),
}
