use taskward_policy::{AccessError, AccessErrorKind};
use thiserror::Error;

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness or reference constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors returned by [`crate::TaskService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Access(#[from] AccessError),

    /// The request payload was rejected before reaching storage.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Access(e) if e.kind == AccessErrorKind::NotFound)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, ServiceError::Access(e) if e.kind == AccessErrorKind::AuthorizationDenied)
    }
}
